// Physical layout tables: (evdev code, unshifted, shifted).
// Both tables cover the same printable block.

pub(super) const US_QWERTY: &[(u16, char, char)] = &[
    (2, '1', '!'),
    (3, '2', '@'),
    (4, '3', '#'),
    (5, '4', '$'),
    (6, '5', '%'),
    (7, '6', '^'),
    (8, '7', '&'),
    (9, '8', '*'),
    (10, '9', '('),
    (11, '0', ')'),
    (12, '-', '_'),
    (13, '=', '+'),
    (16, 'q', 'Q'),
    (17, 'w', 'W'),
    (18, 'e', 'E'),
    (19, 'r', 'R'),
    (20, 't', 'T'),
    (21, 'y', 'Y'),
    (22, 'u', 'U'),
    (23, 'i', 'I'),
    (24, 'o', 'O'),
    (25, 'p', 'P'),
    (26, '[', '{'),
    (27, ']', '}'),
    (30, 'a', 'A'),
    (31, 's', 'S'),
    (32, 'd', 'D'),
    (33, 'f', 'F'),
    (34, 'g', 'G'),
    (35, 'h', 'H'),
    (36, 'j', 'J'),
    (37, 'k', 'K'),
    (38, 'l', 'L'),
    (39, ';', ':'),
    (40, '\'', '"'),
    (41, '`', '~'),
    (43, '\\', '|'),
    (44, 'z', 'Z'),
    (45, 'x', 'X'),
    (46, 'c', 'C'),
    (47, 'v', 'V'),
    (48, 'b', 'B'),
    (49, 'n', 'N'),
    (50, 'm', 'M'),
    (51, ',', '<'),
    (52, '.', '>'),
    (53, '/', '?'),
    (86, '<', '>'),
];

pub(super) const UKRAINIAN: &[(u16, char, char)] = &[
    (2, '1', '!'),
    (3, '2', '"'),
    (4, '3', '№'),
    (5, '4', ';'),
    (6, '5', '%'),
    (7, '6', ':'),
    (8, '7', '?'),
    (9, '8', '*'),
    (10, '9', '('),
    (11, '0', ')'),
    (12, '-', '_'),
    (13, '=', '+'),
    (16, 'й', 'Й'),
    (17, 'ц', 'Ц'),
    (18, 'у', 'У'),
    (19, 'к', 'К'),
    (20, 'е', 'Е'),
    (21, 'н', 'Н'),
    (22, 'г', 'Г'),
    (23, 'ш', 'Ш'),
    (24, 'щ', 'Щ'),
    (25, 'з', 'З'),
    (26, 'х', 'Х'),
    (27, 'ї', 'Ї'),
    (30, 'ф', 'Ф'),
    (31, 'і', 'І'),
    (32, 'в', 'В'),
    (33, 'а', 'А'),
    (34, 'п', 'П'),
    (35, 'р', 'Р'),
    (36, 'о', 'О'),
    (37, 'л', 'Л'),
    (38, 'д', 'Д'),
    (39, 'ж', 'Ж'),
    (40, 'є', 'Є'),
    (41, '\'', '~'),
    (43, 'ґ', 'Ґ'),
    (44, 'я', 'Я'),
    (45, 'ч', 'Ч'),
    (46, 'с', 'С'),
    (47, 'м', 'М'),
    (48, 'и', 'И'),
    (49, 'т', 'Т'),
    (50, 'ь', 'Ь'),
    (51, 'б', 'Б'),
    (52, 'ю', 'Ю'),
    (53, '.', ','),
    (86, '/', '|'),
];

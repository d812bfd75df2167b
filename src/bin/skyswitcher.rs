// SkySwitcher Pure Rust CLI
// Watches the keyboards and fixes words typed in the wrong layout

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;

use skyswitcher_core::event::{EventLoop, EventLoopError};
use skyswitcher_core::output::{UInputError, VirtualDevice};
use skyswitcher_core::{Config, Daemon, TriggerStyle};

/// Poll timeout; also bounds how late an armed gesture expires
const POLL_TIMEOUT_MS: i32 = 100;

/// Keyboard layout auto-corrector (English / Ukrainian)
#[derive(Parser, Debug)]
#[command(name = "skyswitcher")]
#[command(author = "skyswitcher contributors")]
#[command(version)]
#[command(about = "Retype the last word in the other keyboard layout on a double tap", long_about = None)]
struct Args {
    /// TOML configuration file (default: ~/.config/skyswitcher/config.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Manually specify devices to watch (can be used multiple times)
    #[arg(short, long = "device", value_name = "DEVICE")]
    devices: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Trigger gesture (double-right-shift, alt+shift, meta+space, ctrl+shift, capslock)
    #[arg(long, value_name = "STYLE")]
    trigger: Option<TriggerStyle>,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,
}

/// Main application state
struct Application {
    config: Config,
    args: Args,
    /// Flag to signal event loop to stop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Config::from_toml_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::load_default().context("failed to load default config")?,
        };

        // CLI flags take precedence over the config file
        if let Some(trigger) = args.trigger {
            config.trigger = trigger;
        }
        if !args.devices.is_empty() {
            config.device_filter = args.devices.clone();
        }

        Ok(Self {
            config,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    fn validate(&self) {
        let c = &self.config;
        println!("Configuration is valid");
        println!("  trigger:        {}", c.trigger);
        println!("  double press:   {} ms", c.double_press.as_millis());
        match c.idle_reset {
            Some(idle) => println!("  idle reset:     {} ms", idle.as_millis()),
            None => println!("  idle reset:     off"),
        }
        println!("  buffer cap:     {}", c.buffer_cap);
        println!("  initial layout: {}", c.initial_layout);
        println!("  switch combo:   {} ({})", c.switch_combo, c.switch_order);
        if !c.device_filter.is_empty() {
            println!("  devices:        {:?}", c.device_filter);
        }
    }

    fn list_devices() {
        let devices = EventLoop::list_devices();
        if devices.is_empty() {
            println!("No input devices readable (are you in the 'input' group?)");
            return;
        }
        println!("Found {} input device(s):", devices.len());
        for device in &devices {
            let marker = if device.is_keyboard { "*" } else { " " };
            println!("  {} {}: {}", marker, device.path, device.name);
        }
        println!("(* = detected as keyboard)");
    }

    fn install_signal_handler(&self) -> anyhow::Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals =
            Signals::new([SIGINT, SIGTERM]).context("failed to install signal handler")?;
        let running = self.running.clone();

        std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                log::info!("received signal {}, shutting down", signal);
                running.store(false, Ordering::SeqCst);
            }
        });
        Ok(())
    }

    /// Run the main event loop
    fn run(&self) -> anyhow::Result<()> {
        self.install_signal_handler()?;

        let mut event_loop = match EventLoop::new_filtered(&self.config.device_filter) {
            Ok(event_loop) => event_loop,
            Err(EventLoopError::DeviceNotFound(msg)) => bail!(
                "{}. Check that your user can read /dev/input/event* (add it to the 'input' group) \
                 or pass --device; --list-devices shows what is visible",
                msg
            ),
            Err(e) => return Err(e).context("failed to open input devices"),
        };
        log::info!("watching {} device(s)", event_loop.device_count());

        let mut output_device = match VirtualDevice::new() {
            Ok(device) => device,
            Err(UInputError::PermissionDenied(msg)) => bail!(
                "cannot open /dev/uinput ({}). Load the uinput module and grant your user \
                 write access to /dev/uinput (e.g. a udev rule for the 'input' group)",
                msg
            ),
            Err(e) => return Err(e).context("failed to create virtual keyboard"),
        };
        output_device.set_throttle_delays(self.config.key_pre_delay_ms, self.config.key_post_delay_ms);

        let mut daemon = Daemon::new(&self.config, output_device);
        println!(
            "skyswitcher is running ({}, layout {}). Press Ctrl+C to exit.",
            self.config.trigger,
            daemon.active_layout()
        );

        let result = self.run_main_loop(&mut event_loop, &mut daemon);

        // Release anything still held before the device disappears
        finish(result, daemon.into_sink().close())
    }

    fn run_main_loop(
        &self,
        event_loop: &mut EventLoop,
        daemon: &mut Daemon<VirtualDevice>,
    ) -> anyhow::Result<()> {
        while self.running.load(Ordering::SeqCst) {
            let events = event_loop.poll(POLL_TIMEOUT_MS).context("reading input events")?;

            if events.is_empty() {
                daemon.tick(Instant::now());
                continue;
            }

            // Each event carries its own kernel time, so time spent emitting a
            // correction does not stretch the gaps between the ones after it
            for (key, action, at) in events {
                log::trace!("event {} {}", key, action);
                // Outcomes are logged by the daemon; failures never stop the loop
                daemon.dispatch(key, action, at);
            }
        }
        Ok(())
    }
}

/// Outcome of a run given how the loop ended and how the close went.
/// A close failure is only logged so it never hides the loop's own error.
fn finish(result: anyhow::Result<()>, closed: Result<(), UInputError>) -> anyhow::Result<()> {
    if let Err(e) = closed {
        log::warn!("failed to close virtual keyboard: {}", e);
    }
    result
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle list-devices flag (doesn't require config)
    if args.list_devices {
        Application::list_devices();
        return Ok(());
    }

    let app = Application::new(args)?;

    if app.args.check_config {
        app.validate();
        return Ok(());
    }

    app.run()
}

// Keychord CLI
// Drives keyboard devices from evdev or a recorded trace through the chord pipeline

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use keychord_core::config::{read_trace, Config};
use keychord_core::event::EventLoop;
use keychord_core::{
    Binding, BindingTable, Chord, CommandExecutor, DeviceFilter, DeviceId, HardwareKeyboard,
    Key, KeyOutcome, KeyState, KeyboardDevice, KeymapCompiler, ModifierMask, Passthrough,
    RuleNames, Seat, SeatHandle,
};

#[cfg(not(feature = "xkb"))]
use keychord_core::{BuiltinCompiler, BuiltinKeyboard};
#[cfg(feature = "xkb")]
use keychord_core::{XkbCompiler, XkbKeyboard};

/// Device name used for the virtual keyboard in trace mode
const TRACE_DEVICE: &str = "trace";

/// Keyboard chord tracker
#[derive(Parser, Debug)]
#[command(name = "keychord")]
#[command(version)]
#[command(about = "Track keyboard chords and dispatch keybindings", long_about = None)]
struct Args {
    /// TOML configuration file (default: ~/.config/keychord/config.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Replay key events from a TOML trace instead of reading devices
    #[arg(short, long, value_name = "TRACE")]
    trace: Option<PathBuf>,

    /// Devices to read, by name or path (can be used multiple times)
    #[arg(short, long, value_name = "DEVICE")]
    devices: Vec<String>,

    /// Log binding commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// List available keyboard devices
    #[arg(long)]
    list_devices: bool,
}

/// Passthrough that logs what a focused client would receive
struct LogPassthrough;

impl Passthrough for LogPassthrough {
    fn set_active_keyboard(&mut self, device: DeviceId) {
        log::debug!("active keyboard: {}", device);
    }

    fn notify_key(&mut self, time_msec: u32, key: Key, state: KeyState) {
        log::info!("forward {} {} @{}", key, state, time_msec);
    }

    fn notify_modifiers(&mut self, modifiers: ModifierMask) {
        log::info!("forward modifiers [{}]", modifiers);
    }
}

/// Runs `exec` commands through the shell and logs everything else
struct ShellExecutor {
    dry_run: bool,
}

/// The shell command of an `exec <cmd>` binding
fn exec_command(command: &str) -> Option<&str> {
    command
        .strip_prefix("exec")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
}

impl CommandExecutor for ShellExecutor {
    fn execute(&mut self, binding: &Binding, chord: &Chord<'_>) {
        log::info!("{} ({}): {}", binding.combo, chord.mode, binding.command);
        let Some(cmd) = exec_command(&binding.command) else {
            return;
        };
        if self.dry_run {
            return;
        }
        if let Err(e) = Command::new("sh").arg("-c").arg(cmd).spawn() {
            log::warn!("Cannot run {:?}: {}", cmd, e);
        }
    }
}

/// Main application state
struct Application {
    config: Config,
    args: Args,
    /// Flag to signal event loop to stop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match &args.config {
            Some(path) => Config::from_toml_path(path)?,
            None => Config::load_default()?,
        };
        if let Some(path) = config.source_path() {
            log::info!("Loaded config {}", path.display());
        }
        Ok(Self {
            config,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// CLI --devices > config [devices].only > autodetect
    fn device_filter(&self) -> DeviceFilter {
        if self.args.devices.is_empty() {
            DeviceFilter::new(self.config.devices().iter().cloned())
        } else {
            DeviceFilter::new(self.args.devices.iter().cloned())
        }
    }

    fn bindings(&self) -> BindingTable<ShellExecutor> {
        self.config.binding_table(ShellExecutor {
            dry_run: self.args.dry_run,
        })
    }

    /// Validate configuration, including the default keymap
    fn validate<C: KeymapCompiler + ?Sized>(
        &self,
        compiler: &C,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let names = self.config.rule_names("*").or(&RuleNames::from_env());
        compiler.compile(&names)?;
        println!(
            "Configuration is valid ({} bindings, keymap {})",
            self.config.binding_count(),
            names
        );
        Ok(())
    }

    fn list_devices(&self) {
        let devices = EventLoop::list_devices(&self.device_filter());
        println!("Found {} keyboard device(s):", devices.len());
        for device in &devices {
            println!("  {}: {} ({})", device.id, device.name, device.path);
        }
    }

    fn add_device<C, H>(
        &self,
        seat: &SeatHandle,
        compiler: &C,
        id: DeviceId,
        name: &str,
    ) -> KeyboardDevice<H>
    where
        C: KeymapCompiler<Keymap = H::Keymap>,
        H: HardwareKeyboard + Default,
    {
        let mut device = KeyboardDevice::new(id, seat, H::default());
        let names = self.config.rule_names(name);
        if let Err(e) = device.configure(compiler, &names, &RuleNames::from_env()) {
            log::debug!("{} ({}) stays unconfigured and ignores input: {}", id, name, e);
        }
        device
    }

    /// Replay a trace through one virtual keyboard
    fn replay<C, H>(&self, compiler: &C, path: &Path) -> Result<(), Box<dyn std::error::Error>>
    where
        C: KeymapCompiler<Keymap = H::Keymap>,
        H: HardwareKeyboard + Default,
    {
        let events = read_trace(path)?;
        let seat = Seat::new("seat0", LogPassthrough).into_handle();
        let mut device: KeyboardDevice<H> =
            self.add_device(&seat, compiler, DeviceId(0), TRACE_DEVICE);
        let mut bindings = self.bindings();

        let mut handled = 0;
        for event in &events {
            if let KeyOutcome::Handled(_) = device.notify_key(event, &mut bindings) {
                handled += 1;
            }
        }
        log::info!("Replayed {} events, {} handled by bindings", events.len(), handled);
        device.destroy();
        Ok(())
    }

    fn install_signal_handler(&self) {
        use signal_hook::iterator::Signals;
        let running = self.running.clone();

        // Spawn a thread to handle signals
        std::thread::spawn(move || {
            if let Ok(mut signals) =
                Signals::new([signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM])
            {
                if signals.forever().next().is_some() {
                    log::info!("Received signal, shutting down");
                    running.store(false, Ordering::SeqCst);
                }
            }
        });
    }

    /// Read live devices until SIGINT/SIGTERM
    fn run<C, H>(&self, compiler: &C) -> Result<(), Box<dyn std::error::Error>>
    where
        C: KeymapCompiler<Keymap = H::Keymap>,
        H: HardwareKeyboard + Default,
    {
        self.install_signal_handler();

        let filter = self.device_filter();
        let mut event_loop = EventLoop::new(&filter)?;
        let seat = Seat::new("seat0", LogPassthrough).into_handle();
        let mut bindings = self.bindings();

        let infos: Vec<_> = event_loop.devices().cloned().collect();
        let mut devices: BTreeMap<DeviceId, KeyboardDevice<H>> = infos
            .iter()
            .map(|info| (info.id, self.add_device(&seat, compiler, info.id, &info.name)))
            .collect();

        log::info!("keychord is running. Press Ctrl+C to exit.");
        while self.running.load(Ordering::SeqCst) {
            for polled in event_loop.poll(100)? {
                if let Some(device) = devices.get_mut(&polled.device) {
                    device.notify_key(&polled.event, &mut bindings);
                }
            }
        }

        for device in devices.into_values() {
            device.destroy();
        }
        Ok(())
    }

    fn start<C, H>(&self, compiler: &C) -> Result<(), Box<dyn std::error::Error>>
    where
        C: KeymapCompiler<Keymap = H::Keymap>,
        H: HardwareKeyboard + Default,
    {
        if self.args.check_config {
            return self.validate(compiler);
        }
        match &self.args.trace {
            Some(path) => self.replay::<C, H>(compiler, path),
            None => self.run::<C, H>(compiler),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let app = Application::new(args)?;

    // Handle list-devices flag
    if app.args.list_devices {
        app.list_devices();
        return Ok(());
    }

    #[cfg(feature = "xkb")]
    return app.start::<_, XkbKeyboard>(&XkbCompiler::new());

    #[cfg(not(feature = "xkb"))]
    return app.start::<_, BuiltinKeyboard>(&BuiltinCompiler);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["keychord", "--config", "/tmp/test.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(args.devices.is_empty());
        assert!(args.trace.is_none());
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.list_devices);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "keychord",
            "--trace",
            "/tmp/trace.toml",
            "--verbose",
            "--dry-run",
            "--devices",
            "/dev/input/event0",
            "--devices",
            "AT Translated Set 2 keyboard",
        ]);

        assert_eq!(args.trace, Some(PathBuf::from("/tmp/trace.toml")));
        assert!(args.verbose);
        assert!(args.dry_run);
        assert_eq!(args.devices.len(), 2);
        assert_eq!(args.devices[1], "AT Translated Set 2 keyboard");
    }

    #[test]
    fn test_args_list_devices() {
        let args = Args::parse_from(["keychord", "--list-devices"]);
        assert!(args.list_devices);
    }

    #[test]
    fn test_exec_command() {
        assert_eq!(exec_command("exec foot"), Some("foot"));
        assert_eq!(exec_command("exec  firefox --new-window "), Some("firefox --new-window"));
        assert_eq!(exec_command("exec"), None);
        assert_eq!(exec_command("executable"), None);
        assert_eq!(exec_command("workspace 2"), None);
    }

    #[cfg(not(feature = "xkb"))]
    #[test]
    fn test_add_device_with_bad_keymap_stays_unconfigured() {
        let config = Config::from_toml("[input.\"*\"]\nxkb_rules = \"bogus\"\n").unwrap();
        let app = Application {
            config,
            args: Args::parse_from(["keychord"]),
            running: Arc::new(AtomicBool::new(true)),
        };
        let seat = Seat::new("seat0", LogPassthrough).into_handle();
        let device: KeyboardDevice<BuiltinKeyboard> =
            app.add_device(&seat, &BuiltinCompiler, DeviceId(0), "USB Keyboard");
        assert!(!device.is_configured());
        assert_eq!(seat.read().subscription_count(), 0);
    }

    #[test]
    fn test_device_filter_prefers_cli() {
        let config = Config::from_toml("[devices]\nonly = [\"Config Keyboard\"]\n").unwrap();
        let app = Application {
            config,
            args: Args::parse_from(["keychord"]),
            running: Arc::new(AtomicBool::new(true)),
        };
        assert_eq!(app.device_filter().names(), &["Config Keyboard".to_string()]);

        let app = Application {
            args: Args::parse_from(["keychord", "--devices", "/dev/input/event4"]),
            ..app
        };
        assert_eq!(app.device_filter().names(), &["/dev/input/event4".to_string()]);
    }
}

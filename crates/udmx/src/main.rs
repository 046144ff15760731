//! udmx
//!
//! Sets DMX512 channel values on an anyma uDMX USB interface.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use udmx::alias::default_alias_path;
use udmx::config::expand_path;
use udmx::{Options, UdmxConfig, setup_logging};

#[derive(Parser, Debug)]
#[command(name = "udmx")]
#[command(
    author,
    version,
    about = "uDMX utility - set DMX512 channels from the command line"
)]
#[command(long_about = "
Sets one DMX512 channel, or a run of consecutive channels, on an anyma uDMX
USB interface.

EXAMPLES:
    # Set channel 120 to 200
    udmx 120 200

    # Set channels 1-3 to 255, 128 and 0
    udmx -v 1 255 128 0

    # Use aliases from ~/.uDMXrc
    udmx front blackout

    # Start the bootloader for a firmware update
    udmx -bootloader

ALIASES:
    ~/.uDMXrc holds one alias per line, '#' starts a comment:
        channel front 7
        values blackout 0 0 0
")]
struct Args {
    /// Verbose, display interesting runtime info
    #[arg(short, long)]
    verbose: bool,

    /// Debug, display debugging info
    #[arg(short, long)]
    debug: bool,

    /// Alias file (default: ~/.uDMXrc)
    #[arg(long, value_name = "PATH")]
    rc: Option<String>,

    /// Path to settings file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start bootloader for firmware update
    #[arg(long, conflicts_with_all = ["list_devices", "channel"])]
    bootloader: bool,

    /// List devices using the shared VID/PID and exit
    #[arg(long, conflicts_with = "channel")]
    list_devices: bool,

    /// Channel number (1-512) or channel alias
    #[arg(allow_negative_numbers = true)]
    channel: Option<String>,

    /// Values (0-255) or value aliases for consecutive channels
    #[arg(allow_negative_numbers = true)]
    values: Vec<String>,
}

fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();

    // The legacy single-dash spelling is accepted as the only argument
    if argv.len() == 2 && argv[1] == "-bootloader" {
        if setup_logging("warn").is_err() {
            return ExitCode::FAILURE;
        }
        bootloader(&Options::default());
        return ExitCode::SUCCESS;
    }

    let args = match Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<udmx::Error>()
                .is_some_and(udmx::Error::shows_usage)
            {
                eprintln!("{}", Args::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    // Settings problems must not change the bootloader's exit status
    if args.bootloader {
        let level = if args.debug { "debug" } else { "warn" };
        setup_logging(level).context("Failed to setup logging")?;
        bootloader(&Options {
            verbose: args.verbose,
            debug: args.debug,
            alias_path: None,
        });
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => UdmxConfig::load(Some(path.clone())).context("Failed to load configuration")?,
        None => UdmxConfig::load_or_default().context("Failed to load configuration")?,
    };

    let alias_path = args
        .rc
        .as_deref()
        .map(expand_path)
        .or_else(|| config.alias_path())
        .or_else(default_alias_path);

    let options = Options {
        verbose: args.verbose,
        debug: args.debug,
        alias_path,
    };

    setup_logging(options.log_level(&config)).context("Failed to setup logging")?;

    if options.verbose {
        eprintln!("uDMX utility, version {}", env!("CARGO_PKG_VERSION"));
    }

    if args.list_devices {
        return list_devices_mode();
    }

    let tokens: Vec<String> = args.channel.into_iter().chain(args.values).collect();
    udmx::set_channels(&tokens, &options)?;
    Ok(())
}

/// Start the bootloader; the outcome never changes the exit status
fn bootloader(options: &Options) {
    println!("Starting bootloader...\nPlease use the ./uboot utility to update firmware.");
    if let Err(e) = udmx::start_bootloader(options) {
        warn!("Bootloader request failed: {}", e);
    }
}

/// List shared-VID/PID devices and exit
fn list_devices_mode() -> Result<()> {
    let candidates = udmx::list_candidates().context("Failed to enumerate USB devices")?;

    if candidates.is_empty() {
        println!(
            "No USB devices with vid={:#06x} pid={:#06x} found.",
            protocol::USBDEV_SHARED_VENDOR,
            protocol::USBDEV_SHARED_PRODUCT
        );
        return Ok(());
    }

    println!("Found {} candidate device(s):\n", candidates.len());
    for (location, identity) in candidates {
        match identity {
            Ok(identity) => {
                let verdict = if identity.is_udmx() { "uDMX" } else { "other" };
                println!(
                    "  {} {:04x}:{:04x} - {} {} [{}]",
                    location,
                    identity.vendor_id,
                    identity.product_id,
                    identity.manufacturer,
                    identity.product,
                    verdict
                );
            }
            Err(e) => println!("  {} - cannot query strings: {}", location, e),
        }
    }

    Ok(())
}

/*
 *  main.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info, warn};
use tokio::runtime::Handle;

use statscreen::config::{self, Cli, Options, Settings};
use statscreen::display::Display;
use statscreen::exit::{listen_for_signals, ExitGate, GracefulExit};
use statscreen::hassio::{supervisor_check, HassioClient, SupervisorHost};
use statscreen::registry::{build_schedule, PlatformSupport};
use statscreen::screens::{HostSources, ScreenDeck};
use statscreen::{scheduler, ScreenError, ScreenKind};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(if cli.debug { "debug" } else { "info" }))
        .format_timestamp_secs()
        .init();

    info!("{} - system stats at a glance", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} for {}", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_TARGET);

    // one line on stderr, whatever the log filter
    if let Err(e) = run(cli).await {
        eprintln!("{}", diagnostic(&e));
        std::process::exit(1);
    }
}

/// The whole error chain on a single line.
fn diagnostic(e: &anyhow::Error) -> String {
    format!("{}: {:#}", env!("CARGO_PKG_NAME"), e).replace('\n', " ")
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let options = config::load(&cli).context("loading options")?;
    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let mut settings = Settings::from_options(&options).map_err(ScreenError::from)?;
    settings.apply_cli_overrides(&cli);
    settings.validate().map_err(ScreenError::from)?;
    debug!("{:?}", settings);

    let exit = GracefulExit::new(ExitGate::new(), settings.graceful_exit_text.clone());
    let gate = exit.gate().clone();
    let signals = tokio::spawn(async move {
        if let Err(e) = listen_for_signals(gate).await {
            error!("Unable to install signal handlers: {}", e);
        }
    });

    // the rotation sleeps between frames, keep it off the async workers
    let runtime = Handle::current();
    let headless = cli.headless;
    let single = cli.screen;
    let rotation = tokio::task::spawn_blocking(move || {
        rotate(options, settings, exit, headless, single, runtime)
    })
    .await;

    signals.abort();
    rotation.context("rotation task stopped unexpectedly")?
}

fn rotate(
    options: Options,
    settings: Settings,
    exit: GracefulExit,
    headless: bool,
    single: Option<ScreenKind>,
    runtime: Handle,
) -> anyhow::Result<()> {
    let platform = PlatformSupport::new(supervisor_check(runtime.clone()));
    let mut schedule = build_schedule(&options, &platform)?;
    if schedule.is_empty() {
        return Err(ScreenError::NoScreensAvailable.into());
    }

    let display = Display::open(&settings.display, headless).context("opening display")?;
    let host = host_sources(&platform, runtime);
    let mut deck = ScreenDeck::new(display, settings, exit.gate().clone(), host);

    if let Some(kind) = single {
        info!("Rendering '{}' once", kind);
        scheduler::render_once(&mut schedule, kind, &exit, &mut deck)?;
        info!("Done");
        return Ok(());
    }

    let summary = scheduler::run(&mut schedule, &exit, &mut deck)?;
    debug!("{:?}", summary);

    // the farewell stays on the panel, anything else is blanked
    if !summary.farewell_shown {
        deck.into_display().clear().context("clearing display")?;
    }
    info!("Done");
    Ok(())
}

fn host_sources(platform: &PlatformSupport, runtime: Handle) -> HostSources {
    if !platform.is_supported() {
        return HostSources::local();
    }
    match HassioClient::from_env() {
        Ok(client) => {
            info!("Using Home Assistant supervisor for host details");
            HostSources::supervised(SupervisorHost::new(client, runtime))
        }
        Err(e) => {
            warn!("Supervisor client unavailable, using local host details: {}", e);
            HostSources::local()
        }
    }
}

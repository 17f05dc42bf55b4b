//! `gitauth login`: drives the device flow poll loop

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail};
use colored::Colorize;
use gitauth_sdk::{Attempt, DeviceFlow, FlowState, GitAuthClient};

use crate::display;
use crate::ui::{present_device_code, UiConfig};

pub async fn run(
    client: &GitAuthClient,
    provider: &str,
    ui: &UiConfig,
    min_interval: Duration,
) -> anyhow::Result<()> {
    let code = client.request_device_code(provider).await?;
    present_device_code(&code, ui);

    let mut flow = DeviceFlow::new(code).with_min_interval(min_interval);
    let mut last_error = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let state = loop {
        match flow.poll(Instant::now()) {
            Attempt::Wait(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = &mut ctrl_c => {
                        flow.cancel();
                    }
                }
            }
            Attempt::Ready(code) => {
                let outcome = client.exchange_device_code(provider, code).await;
                let state = flow.record(&outcome);
                if let Err(e) = outcome {
                    log::debug!("exchange attempt {} failed: {}", flow.attempts(), e);
                    if state.is_terminal() {
                        last_error = Some(e);
                    } else if ui.print_console {
                        print!(".");
                        std::io::stdout().flush().ok();
                    }
                }
            }
            Attempt::Done(state) => break state,
        }
    };

    if ui.print_console {
        println!();
    }

    match state {
        FlowState::Exchanged => {
            let session = client.auth_status(provider).await?;
            if !session.authenticated {
                bail!("{} reported the device code as exchanged, but the session is not authenticated", provider);
            }
            println!("{}", "✅ Authentication successful!".green());
            display::print_session(provider, &session);
            Ok(())
        }
        FlowState::Expired => {
            bail!("The device code expired. Run `gitauth login {}` again.", provider)
        }
        FlowState::Denied => bail!("Authorization was denied."),
        FlowState::Cancelled => bail!("Login cancelled."),
        FlowState::Failed => Err(last_error
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow!("Device authorization failed."))),
        FlowState::Requested | FlowState::Pending => {
            bail!("Device authorization ended unexpectedly.")
        }
    }
}

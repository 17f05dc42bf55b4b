//! How the device code is presented to the user

use colored::Colorize;
use gitauth_sdk::DeviceCode;

/// Controls how the device authorization prompt is shown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiConfig {
    /// Whether to automatically open the browser for device authorization
    pub open_browser: bool,

    /// Whether to print messages to console
    pub print_console: bool,
}

impl UiConfig {
    /// Console output only
    pub fn headless() -> Self {
        Self {
            open_browser: false,
            print_console: true,
        }
    }

    pub fn with_browser(mut self) -> Self {
        self.open_browser = true;
        self
    }

    /// Console output, plus the browser when `open_browser` is set and supported
    pub fn interactive(open_browser: bool) -> Self {
        let config = Self::headless();
        if open_browser && cfg!(feature = "browser") {
            config.with_browser()
        } else {
            config
        }
    }
}

/// Show the user code and where to enter it. The device code itself is never shown.
pub fn present_device_code(code: &DeviceCode, ui: &UiConfig) {
    if ui.print_console {
        print_device_code_console(code);
    }

    #[cfg(feature = "browser")]
    if ui.open_browser {
        match webbrowser::open(&code.verification_uri) {
            Ok(()) => {
                if ui.print_console {
                    println!("  {}", "🌐 Browser opened".dimmed());
                }
            }
            Err(e) => log::warn!("Failed to open browser: {}", e),
        }
    }
}

fn print_device_code_console(code: &DeviceCode) {
    println!();
    println!("{}", "🔐 Git provider authorization required".cyan().bold());
    println!();
    println!("  1. Open your browser and navigate to:");
    println!("     {}", code.verification_uri.underline());
    println!();
    println!("  2. Enter the following code:");
    println!();
    println!("     ┌─────────────────────────┐");
    println!("     │  {:^23}│", code.user_code);
    println!("     └─────────────────────────┘");
    println!();
    println!(
        "  ⏳ Waiting for authorization (expires in {} seconds)...",
        code.expires_in_secs
    );
    println!();
}

use colored::Colorize;
use gitauth_sdk::{AuthSession, Identity, Repository, RepositoryPage};

pub fn print_session(provider: &str, session: &AuthSession) {
    println!("{}", format!("📋 {} ({})", provider, session.provider_type).cyan().bold());

    match (&session.user, session.authenticated) {
        (Some(user), true) => println!("  Signed in as {}", describe_identity(user).green()),
        _ => println!("  {}", "Not authenticated".yellow()),
    }
    if session.authenticated {
        let flow = if session.device { "device flow" } else { "web flow" };
        println!("  {}", format!("Linked via {}", flow).dimmed());
    }

    if !session.installations.is_empty() {
        println!();
        println!("  Installations:");
        for installation in &session.installations {
            println!(
                "    #{} {}  {}",
                installation.id,
                installation.account.login.bold(),
                installation.configure_url.dimmed()
            );
        }
    }

    if session.app_installable && !session.app_install_url.is_empty() {
        println!();
        println!("  Install the app: {}", session.app_install_url.underline());
    }
}

pub fn print_repositories(page: &RepositoryPage) {
    for repo in &page.repos {
        println!("{}", describe_repository(repo));
    }
    println!();
    println!(
        "{}",
        format!("{} shown, {} total", page.repos.len(), page.total).dimmed()
    );
}

fn describe_identity(identity: &Identity) -> String {
    if identity.display_name.is_empty() || identity.display_name == identity.login {
        identity.login.clone()
    } else {
        format!("{} ({})", identity.login, identity.display_name)
    }
}

fn describe_repository(repo: &Repository) -> String {
    let mut line = format!(
        "{}/{}",
        repo.owner.login,
        repo.name.bold()
    );
    if !repo.language.is_empty() {
        line.push_str(&format!("  [{}]", repo.language));
    }
    line.push_str(&format!("  ★ {}", repo.stargazers_count));
    if !repo.description.is_empty() {
        line.push_str(&format!("  {}", repo.description.dimmed()));
    }
    line
}

use anyhow::Result;
use colored::Colorize;

use crate::auth::{self, StoredCredentials};
use crate::output::{print_error, print_success};

pub fn login(endpoint: &str, token: &str, profile: &str) -> Result<()> {
    let creds = StoredCredentials {
        endpoint: endpoint.to_string(),
        token: token.to_string(),
    };
    auth::save_credentials(profile, &creds)?;
    print_success(&format!(
        "Saved API token for {} (profile: {})",
        endpoint.cyan(),
        profile.cyan()
    ));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if auth::remove_credentials(profile)? {
        print_success("Logged out (credentials removed)");
    } else {
        println!("No credentials found for profile \"{profile}\"");
    }
    Ok(())
}

pub fn whoami(profile: &str) -> Result<()> {
    match auth::load_credentials(profile)? {
        Some(creds) => {
            println!("{}: {}", "Profile".cyan(), profile);
            println!("{}: {}", "Endpoint".cyan(), creds.endpoint.cyan());
            println!("{}: {}", "Token".cyan(), creds.token_preview());
        }
        None => {
            print_error(&format!("Not logged in (profile: \"{profile}\")"));
        }
    }
    Ok(())
}

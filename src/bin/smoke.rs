//! Manual smoke test for the profile-update flow.
//!
//! Runs the same field-level checks the profile form performs before
//! submitting, mints a session token, calls the session-gated proxy route,
//! and prints the relayed verdict. `--delete` additionally exercises account
//! deletion behind an interactive confirmation.

use clap::Parser;
use uuid::Uuid;

use accountd::auth::jwt::JwtKeys;
use accountd::config::JwtConfig;
use accountd::users::repo::Role;
use accountd::users::validation::{is_valid_email, is_valid_password, PASSWORD_MIN_LEN};

#[derive(Parser)]
#[command(name = "smoke", about = "Exercise the profile-update endpoint", long_about = None)]
struct Args {
    /// Target user id
    #[arg(long)]
    user_id: Uuid,

    /// Mint an admin session instead of the target user's own
    #[arg(long)]
    admin: bool,

    /// New email address
    #[arg(long)]
    email: Option<String>,

    /// New password
    #[arg(long)]
    password: Option<String>,

    /// Confirmation of the new password
    #[arg(long)]
    confirm_password: Option<String>,

    /// Current password, required when changing the password
    #[arg(long)]
    current_password: Option<String>,

    /// Delete the account after a confirmation prompt
    #[arg(long)]
    delete: bool,

    /// Service base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Same checks the profile form runs before submitting; the server stays
    // authoritative
    if let Some(email) = args.email.as_deref() {
        if !is_valid_email(&email.trim().to_lowercase()) {
            anyhow::bail!("invalid email address");
        }
    }
    if let Some(password) = args.password.as_deref() {
        if !is_valid_password(password) {
            anyhow::bail!("new password must be at least {PASSWORD_MIN_LEN} characters long");
        }
        if let Some(confirm) = args.confirm_password.as_deref() {
            if confirm != password {
                anyhow::bail!("password confirmation does not match");
            }
        }
        if args.current_password.is_none() {
            anyhow::bail!("current password is required to change the password");
        }
    }

    let keys = JwtKeys::from_config(&jwt_config_from_env()?);
    let role = if args.admin { Role::Admin } else { Role::User };
    let token = keys.sign(args.user_id, role)?;

    let client = reqwest::Client::new();
    let base = args.base_url.trim_end_matches('/');

    let body = serde_json::json!({
        "email": args.email.as_deref(),
        "password": args.password.as_deref(),
        "currentPassword": args.current_password.as_deref(),
    });

    let response = client
        .put(format!("{base}/api/users/{}/profile", args.user_id))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    println!("PUT /api/users/{}/profile -> {status}", args.user_id);
    println!("{text}");

    // The form refreshes the session after an email change so later
    // authorization checks see the new identity
    let token = if status.is_success() && args.email.is_some() {
        println!("session refreshed");
        keys.sign(args.user_id, role)?
    } else {
        token
    };

    if args.delete {
        if confirm_deletion()? {
            let response = client
                .delete(format!("{base}/users/{}", args.user_id))
                .bearer_auth(&token)
                .send()
                .await?;
            println!("DELETE /users/{} -> {}", args.user_id, response.status());
            println!("signed out");
        } else {
            println!("deletion cancelled");
        }
    }

    Ok(())
}

fn jwt_config_from_env() -> anyhow::Result<JwtConfig> {
    Ok(JwtConfig {
        secret: std::env::var("JWT_SECRET")?,
        issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "accountd".into()),
        audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "accountd-users".into()),
        ttl_minutes: 60,
    })
}

fn confirm_deletion() -> anyhow::Result<bool> {
    use std::io::{self, Write};

    print!("Delete this account permanently? [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

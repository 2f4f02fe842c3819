use crate::AppState;

pub async fn login(state: &AppState, username: &str, password: &str) -> anyhow::Result<()> {
    state
        .auth
        .login_with_password(username, password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Login failed. Please check your credentials.")))?;

    tracing::info!(username, "User logged in");
    println!("Logged in as {}", username);
    Ok(())
}

pub async fn logout(state: &AppState) -> anyhow::Result<()> {
    state.auth.restore().await?;
    state.auth.logout().await;
    println!("Logged out");
    Ok(())
}

/// Report the session and, when the backend provides it, how long the token
/// remains valid.
pub async fn status(state: &AppState) -> anyhow::Result<()> {
    let credential = state.auth.require_credential()?;
    println!("Logged in");

    match state.auth_client.validate_token(&credential).await {
        Ok(validation) => {
            if let Some(expires_at) = validation.expires_at {
                println!("Token expires at {}", expires_at);
            }
            if let Some(minutes) = validation.remaining_minutes {
                println!("Remaining minutes: {:.0}", minutes);
            }
        }
        Err(e) => tracing::debug!(error = %e, "Token details unavailable"),
    }
    Ok(())
}

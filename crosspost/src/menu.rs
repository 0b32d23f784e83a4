use crate::ops::{reddit, youtube};
use crate::prompt::{parse_choice, prompt};
use crate::session::Session;
use anyhow::Result;

/// Top-level interactive loop. Errors from individual operations are
/// rendered and the loop continues; only a failed session establishment is
/// fatal.
pub async fn run() -> Result<()> {
    loop {
        println!("\n=== crosspost ===");
        println!("  1) Reddit");
        println!("  2) YouTube");
        println!("  q) Quit");

        let choice = prompt("Choose platform")?;
        match choice.as_str() {
            "q" | "Q" => return Ok(()),
            other => match parse_choice(other, 2) {
                Some(1) => reddit_menu().await?,
                Some(2) => youtube_menu().await?,
                _ => println!("Unrecognized choice."),
            },
        }
    }
}

async fn youtube_menu() -> Result<()> {
    // Credential and channel verification happen once, up front.
    let session = Session::establish().await?;

    loop {
        println!("\n--- YouTube ---");
        println!("  1) Upload video");
        println!("  2) Read video");
        println!("  3) Update video");
        println!("  4) Delete video");
        println!("  5) List my videos");
        println!("  b) Back");

        let choice = prompt("Choose operation")?;
        let result = match choice.as_str() {
            "b" | "B" => return Ok(()),
            other => match parse_choice(other, 5) {
                Some(1) => youtube::upload(&session).await,
                Some(2) => youtube::read(&session).await,
                Some(3) => youtube::update(&session).await,
                Some(4) => youtube::delete(&session).await,
                Some(5) => youtube::list(&session).await,
                _ => {
                    println!("Unrecognized choice.");
                    Ok(())
                }
            },
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "YouTube operation failed");
            println!("Error: {e}");
        }
    }
}

async fn reddit_menu() -> Result<()> {
    let client = match reddit::connect().await {
        Ok(client) => {
            println!("Authenticated with Reddit.");
            client
        }
        Err(e) => {
            tracing::error!(error = %e, "Reddit authentication failed");
            println!("Failed to authenticate with Reddit: {e}");
            return Ok(());
        }
    };

    loop {
        println!("\n--- Reddit ---");
        println!("  1) Create post");
        println!("  2) Read post");
        println!("  3) Update post");
        println!("  4) Delete post");
        println!("  b) Back");

        let choice = prompt("Choose operation")?;
        let result = match choice.as_str() {
            "b" | "B" => return Ok(()),
            other => match parse_choice(other, 4) {
                Some(1) => reddit::create(&client).await,
                Some(2) => reddit::read(&client).await,
                Some(3) => reddit::update(&client).await,
                Some(4) => reddit::delete(&client).await,
                _ => {
                    println!("Unrecognized choice.");
                    Ok(())
                }
            },
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "Reddit operation failed");
            println!("Error: {e}");
        }
    }
}

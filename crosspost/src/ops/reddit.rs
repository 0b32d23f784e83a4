use crate::prompt::{confirm, parse_choice, prompt};
use anyhow::Result;
use reddit_api::{Client, RedditCredentials};
use std::path::Path;

pub async fn connect() -> Result<Client> {
    let credentials = RedditCredentials::from_env()?;
    Ok(Client::login(credentials).await?)
}

pub async fn create(client: &Client) -> Result<()> {
    let subreddit = prompt("Subreddit")?;
    println!("  1) Text");
    println!("  2) Image");
    println!("  3) Video");
    let kind = loop {
        let choice = prompt("Post type")?;
        match parse_choice(&choice, 3) {
            Some(n) => break n,
            None => println!("Unrecognized choice."),
        }
    };
    let title = prompt("Post title")?;

    let id = match kind {
        1 => {
            let text = prompt("Content")?;
            Some(client.submit_self_post(&subreddit, &title, &text).await?)
        }
        2 => {
            let path = prompt("Image path")?;
            client
                .submit_image_post(&subreddit, &title, Path::new(&path))
                .await?
        }
        _ => {
            let path = prompt("Video path")?;
            client
                .submit_video_post(&subreddit, &title, Path::new(&path))
                .await?
        }
    };

    match id {
        Some(id) => {
            tracing::info!(post_id = %id, "post created");
            println!("Post created. ID: {id}");
        }
        // Media submits report completion out of band and may omit the id.
        None => println!("Post submitted."),
    }
    Ok(())
}

pub async fn read(client: &Client) -> Result<()> {
    let id = prompt("Post ID")?;
    let post = client.get_post(&id).await?;

    println!("Title:     {}", post.title);
    println!("Author:    u/{}", post.author);
    println!("Subreddit: r/{}", post.subreddit);
    println!("Content:   {}", post.selftext);
    Ok(())
}

pub async fn update(client: &Client) -> Result<()> {
    let id = prompt("Post ID")?;
    let text = prompt("New content")?;

    client.edit_post(&id, &text).await?;
    println!("Post updated.");
    Ok(())
}

pub async fn delete(client: &Client) -> Result<()> {
    let id = prompt("Post ID")?;
    if !confirm(&format!("Delete post {id}?"))? {
        println!("Aborted.");
        return Ok(());
    }

    client.delete_post(&id).await?;
    println!("Post deleted.");
    Ok(())
}

use crate::prompt::{confirm, prompt, prompt_or};
use crate::session::Session;
use anyhow::Result;
use std::io::Write;
use tube_api::endpoints::videos::{apply_update, PrivacyStatus, SnippetUpdate, Video};
use tube_api::upload::{HttpTransport, UploadSession, VideoMeta};
use tube_api::Request;

pub async fn upload(session: &Session) -> Result<()> {
    let path = prompt("Video file path")?;
    let title = prompt("Title")?;
    let description = prompt("Description")?;
    let privacy: PrivacyStatus = prompt_or("Privacy status", "private")?
        .parse()
        .map_err(anyhow::Error::msg)?;

    let meta = VideoMeta::new(title)
        .description(description)
        .privacy(privacy);
    let transport = HttpTransport::new(&session.token.access_token);
    let upload = UploadSession::open(transport, &path, meta).await?;

    println!("Starting video upload...");
    let video = upload
        .run(|fraction| {
            print!("\rUploaded {:>3.0}%", fraction * 100.0);
            std::io::stdout().flush().ok();
        })
        .await?;
    println!();

    tracing::info!(video_id = %video.id, "upload completed");
    println!("Upload completed. Video ID: {}", video.id);
    Ok(())
}

pub async fn read(session: &Session) -> Result<()> {
    let id = prompt("Video ID")?;
    let video = session
        .client
        .send(Request::videos().get(id.into()))
        .await?
        .into_video()?;

    print_video(&video);
    Ok(())
}

/// Read-modify-write: fetch the current snippet, overlay the supplied
/// fields, submit the full record back.
pub async fn update(session: &Session) -> Result<()> {
    let id = prompt("Video ID")?;
    let title = prompt("New title (blank to keep)")?;
    let description = prompt("New description (blank to keep)")?;

    let update = SnippetUpdate::new().title(title).description(description);
    if update.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let video = session
        .client
        .send(Request::videos().get(id.as_str().into()))
        .await?
        .into_video()?;

    let mut snippet = video.snippet;
    apply_update(&mut snippet, &update);

    let updated = session
        .client
        .send(Request::videos().update(id.into(), snippet))
        .await?;

    println!("Updated: {}", updated.snippet.title);
    Ok(())
}

pub async fn delete(session: &Session) -> Result<()> {
    let id = prompt("Video ID")?;
    if !confirm(&format!("Delete video {id}?"))? {
        println!("Aborted.");
        return Ok(());
    }

    session
        .client
        .send(Request::videos().delete(id.as_str().into()))
        .await?;

    tracing::info!(video_id = %id, "video deleted");
    println!("Video deleted.");
    Ok(())
}

pub async fn list(session: &Session) -> Result<()> {
    let limit: u32 = prompt_or("Max results", "10")?.parse()?;
    let response = session
        .client
        .send(Request::search().my_videos(limit))
        .await?;

    if response.items.is_empty() {
        println!("No videos found for {}.", session.channel.title);
        return Ok(());
    }

    for item in &response.items {
        let id = item
            .id
            .video_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}  {}", id, item.snippet.title);
    }
    Ok(())
}

fn print_video(video: &Video) {
    println!("ID:          {}", video.id);
    println!("Title:       {}", video.snippet.title);
    println!("Description: {}", video.snippet.description);
    if let Some(status) = &video.status {
        println!("Privacy:     {}", status.privacy_status);
    }
    if let Some(stats) = &video.statistics {
        println!(
            "Views:       {}",
            stats.view_count.as_deref().unwrap_or("-")
        );
    }
}

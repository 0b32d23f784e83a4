use tube_api::{Client, Request, TubeApiError};

#[tokio::main]
pub async fn main() -> Result<(), TubeApiError> {
    let client = Client::new("access_token");

    let req = Request::videos().get("dQw4w9WgXcQ".into());

    let video = client.send(req).await?.into_video()?;
    println!("{}: {}", video.id, video.snippet.title);
    Ok(())
}

use crate::types::{Gif, MediaEmbed, PostData, RedditPost};
use tracing::debug;

/// Local asset substituted when upstream has no usable thumbnail.
pub const DEFAULT_THUMBNAIL: &str = "/assets/default.png";

/// Placeholder strings the listing API returns instead of a thumbnail URL.
const THUMBNAIL_SENTINELS: [&str; 3] = ["default", "none", "nsfw"];

/// Convert a page of raw posts, dropping everything without a playable
/// source.
pub fn posts_to_gifs(posts: &[RedditPost]) -> Vec<Gif> {
    let gifs: Vec<Gif> = posts
        .iter()
        .filter_map(|post| post_to_gif(&post.data))
        .collect();

    if gifs.len() < posts.len() {
        debug!("Dropped {} posts without a playable source", posts.len() - gifs.len());
    }

    gifs
}

/// Convert one raw post, or `None` when no playable source resolves.
pub fn post_to_gif(post: &PostData) -> Option<Gif> {
    let src = best_src_for_post(post)?;

    Some(Gif {
        src,
        thumbnail: resolve_thumbnail(&post.thumbnail),
        author: post.author.clone(),
        id: post.name.clone(),
        permalink: post.permalink.clone(),
        title: post.title.clone(),
        comment_count: post.num_comments,
    })
}

/// Pick a directly playable URL for a post, trying each rule in strict
/// priority order: direct `.mp4`, rewritten `.gifv`/`.webm`, then the
/// nested video fallbacks.
pub fn best_src_for_post(post: &PostData) -> Option<String> {
    if post.url.contains(".mp4") {
        return Some(post.url.clone());
    }

    if post.url.contains(".gifv") {
        return Some(post.url.replacen(".gifv", ".mp4", 1));
    }

    if post.url.contains(".webm") {
        return Some(post.url.replacen(".webm", ".mp4", 1));
    }

    if let Some(fallback) = embed_fallback(post.secure_media.as_ref()) {
        return Some(fallback.to_string());
    }

    if let Some(fallback) = embed_fallback(post.media.as_ref()) {
        return Some(fallback.to_string());
    }

    if let Some(video) = post.preview.as_ref().and_then(|p| p.reddit_video_preview.as_ref()) {
        if let Some(fallback) = video.fallback_url.as_deref() {
            return Some(fallback.to_string());
        }
    }

    None
}

fn embed_fallback(embed: Option<&MediaEmbed>) -> Option<&str> {
    embed?.reddit_video.as_ref()?.fallback_url.as_deref()
}

/// Substitute sentinel placeholders, then reject anything that is not a
/// plain `.jpg`/`.png` URL.
pub fn resolve_thumbnail(raw: &str) -> String {
    let mapped = if THUMBNAIL_SENTINELS.contains(&raw) {
        DEFAULT_THUMBNAIL
    } else {
        raw
    };

    if mapped.ends_with(".jpg") || mapped.ends_with(".png") {
        mapped.to_string()
    } else {
        DEFAULT_THUMBNAIL.to_string()
    }
}

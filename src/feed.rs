use spin_sdk::http::{Request, Response};
use crate::models::models::{Page, Post, PostView, ProfileSummary};
use crate::core::errors::ApiError;
use crate::core::kv::Kv;
use crate::core::query_params::{get_int, parse_query_params};
use crate::auth::validate_token;
use crate::config::*;
use crate::{follow, posts, users};

/// Newest first: creation timestamp descending, id descending as tiebreak.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Fixed-size 1-based pagination. Pages below 1 clamp to 1; pages past the
/// end yield an empty page with intact metadata.
pub fn paginate<T>(items: Vec<T>, page: usize) -> Page<T> {
    let page = page.max(1);
    let total_pages = items.len().div_ceil(POSTS_PER_PAGE).max(1);
    let items: Vec<T> = items
        .into_iter()
        .skip((page - 1) * POSTS_PER_PAGE)
        .take(POSTS_PER_PAGE)
        .collect();

    Page {
        items,
        page,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1,
    }
}

fn format_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%b %-d, %Y, %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Serialize one post for a given viewer. The like flag is derived from the
/// same edge list as the count, so the two can never disagree.
pub fn to_view<S: Kv>(store: &S, post: &Post, viewer_id: Option<&str>) -> anyhow::Result<PostView> {
    let author = users::get_user(store, &post.author_id)?
        .map(|u| u.username)
        .unwrap_or_default();
    let likes_count = posts::like_count(store, post.id)?;
    let liked_by_viewer = match viewer_id {
        Some(viewer) => posts::is_liked_by(store, post.id, viewer)?,
        None => false,
    };

    Ok(PostView {
        id: post.id,
        author,
        author_id: post.author_id.clone(),
        content: post.content.clone(),
        timestamp: format_timestamp(&post.created_at),
        likes_count,
        liked_by_viewer,
    })
}

fn render_page<S: Kv>(
    store: &S,
    page: Page<Post>,
    viewer_id: Option<&str>,
) -> anyhow::Result<Page<PostView>> {
    let mut items = Vec::with_capacity(page.items.len());
    for post in &page.items {
        items.push(to_view(store, post, viewer_id)?);
    }
    Ok(Page {
        items,
        page: page.page,
        total_pages: page.total_pages,
        has_next: page.has_next,
        has_previous: page.has_previous,
    })
}

pub fn global_feed<S: Kv>(
    store: &S,
    page: usize,
    viewer_id: Option<&str>,
) -> anyhow::Result<Page<PostView>> {
    let mut all = posts::all_posts(store)?;
    sort_posts(&mut all);
    render_page(store, paginate(all, page), viewer_id)
}

pub fn profile_feed<S: Kv>(
    store: &S,
    username: &str,
    page: usize,
    viewer_id: Option<&str>,
) -> Result<(ProfileSummary, Page<PostView>), ApiError> {
    let user = users::find_by_username(store, username)?
        .ok_or_else(|| ApiError::UserNotFound(username.to_string()))?;

    let is_following = match viewer_id {
        Some(viewer) => follow::is_following(store, viewer, &user.id)?,
        None => false,
    };
    let summary = ProfileSummary {
        username: user.username,
        following_count: follow::following_count(store, &user.id)?,
        followers_count: follow::followers_count(store, &user.id)?,
        is_following,
    };

    let mut authored = posts::posts_by(store, &user.id)?;
    sort_posts(&mut authored);
    let page = render_page(store, paginate(authored, page), viewer_id)?;

    Ok((summary, page))
}

/// Union of posts authored by everyone the viewer follows. Following nobody
/// yields an empty page, not an error.
pub fn following_feed<S: Kv>(
    store: &S,
    viewer_id: &str,
    page: usize,
) -> anyhow::Result<Page<PostView>> {
    let mut followed_posts = Vec::new();
    for followed_id in follow::followings_of(store, viewer_id)? {
        followed_posts.extend(posts::posts_by(store, &followed_id)?);
    }
    sort_posts(&mut followed_posts);
    render_page(store, paginate(followed_posts, page), Some(viewer_id))
}

// === HTTP handlers ===

pub fn handle_posts<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let params = parse_query_params(req.uri());
    let page = get_int(&params, "page", 1);
    let viewer_id = validate_token(store, &req);

    let feed = global_feed(store, page, viewer_id.as_deref())?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&feed)?)
        .build())
}

pub fn handle_post<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let post_id = match req.path().trim_start_matches("/posts/").parse::<u64>() {
        Ok(id) => id,
        Err(_) => return Ok(ApiError::BadRequest("Post ID required.".to_string()).into()),
    };

    let post = match posts::get_post(store, post_id)? {
        Some(post) => post,
        None => return Ok(ApiError::NotFound("Post not found.".to_string()).into()),
    };

    let viewer_id = validate_token(store, &req);
    let view = to_view(store, &post, viewer_id.as_deref())?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&view)?)
        .build())
}

pub fn handle_profile<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let raw = req.path().trim_start_matches("/profile/");
    let username = urlencoding::decode(raw)
        .unwrap_or(std::borrow::Cow::Borrowed(raw))
        .to_string();
    if username.is_empty() {
        return Ok(ApiError::BadRequest("Username required.".to_string()).into());
    }

    let params = parse_query_params(req.uri());
    let page = get_int(&params, "page", 1);
    let viewer_id = validate_token(store, &req);

    let (summary, page) = match profile_feed(store, &username, page, viewer_id.as_deref()) {
        Ok(result) => result,
        Err(err) => return Ok(err.into()),
    };

    let mut body = serde_json::to_value(&page)?;
    body["user"] = serde_json::to_value(&summary)?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&body)?)
        .build())
}

pub fn handle_following<S: Kv>(store: &S, req: Request) -> anyhow::Result<Response> {
    let viewer_id = match validate_token(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthenticated.into()),
    };

    let params = parse_query_params(req.uri());
    let page = get_int(&params, "page", 1);

    let feed = following_feed(store, &viewer_id, page)?;

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&feed)?)
        .build())
}

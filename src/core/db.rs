use tracing::info;
use crate::core::kv::Kv;
use crate::{follow, posts, users};

/// Seed a handful of demo accounts with posts, a follow edge and a like.
/// Safe to call repeatedly; a no-op once the demo users exist.
pub fn seed_demo_data<S: Kv>(store: &S) -> anyhow::Result<()> {
    if users::find_by_username(store, "test")?.is_some() {
        return Ok(());
    }

    let test = users::create_user(store, "test", "test@example.com", "test")?;
    let alice = users::create_user(store, "alice", "alice@example.com", "alice")?;
    let bob = users::create_user(store, "bob", "bob@example.com", "bob")?;

    posts::create_post(store, &test.id, "This is my first post here!")?;
    posts::create_post(store, &alice.id, "Welcome to my feed! Excited to share thoughts here.")?;
    posts::create_post(store, &alice.id, "Just finished an amazing project. Feeling productive today!")?;
    let bob_post = posts::create_post(
        store,
        &bob.id,
        "Hey everyone! Just joined, looking forward to connecting with you all.",
    )?;

    follow::follow_user(store, &test.id, &bob.id)?;
    posts::like_post(store, bob_post.id, &test.id)?;

    info!("seeded demo data");
    Ok(())
}

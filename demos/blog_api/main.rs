//! Blog API demo: in-memory users and posts behind the full route table
//!
//! ```text
//! JWT_SECRET=access REFRESH_SECRET=refresh cargo run --example blog_api
//! # or put JWT_SECRET / REFRESH_SECRET in ./.env
//! curl -X POST localhost:1337/api/auth/local \
//!      -H 'content-type: application/json' \
//!      -d '{"identifier":"alice@example.com","password":"password123"}'
//! ```

use depo::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,depo=debug")),
        )
        .init();

    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = AppConfig::load(config_path.as_deref())?;

    let users = InMemoryUserService::new();
    let posts = InMemoryPostService::new();
    seed(&users, &posts).await?;

    println!("🚀 Depo blog API on http://{}{}", config.server.address(), config.api.prefix);
    println!("   login as alice@example.com / password123\n");

    let address = config.server.address();
    ServerBuilder::new()
        .with_config(config)
        .with_user_service(users)
        .with_post_service(posts)
        .serve(&address)
        .await
}

async fn seed(users: &InMemoryUserService, posts: &InMemoryPostService) -> Result<()> {
    let alice = User::new_local("alice", "alice@example.com", hash_password("password123")?);
    users.create(alice).await?;

    let seeded = [
        Post::new("1", "Ownership in Rust")
            .with_description("Moves, borrows and lifetimes")
            .with_text("Every value has a single owner.")
            .published(),
        Post::new("2", "Київ навесні")
            .with_description("Фотографії з прогулянки")
            .published(),
        Post::new("3", "Async Rust")
            .with_description("Futures and executors")
            .published(),
        Post::new("4", "Draft: error handling").with_text("Not published yet"),
    ];
    for post in seeded {
        posts.create(post).await?;
    }

    Ok(())
}

use std::{fs, path::Path};

use anyhow::Context;
use db::models::{
    blog_post::{BlogPost, BlogPostId},
    subscriber::{Subscriber, SubscriberList},
    tool::{CategoryCount, Tool},
};
use server::routes::{
    chat::{ChatRequest, ChatResponse},
    forms::{AdvertisingReceipt, SubmissionReceipt},
    newsletter::{SubscribeRequest, SubscribedEmail},
};
use ts_rs::TS;

const OUTPUT: &str = "shared/types.ts";

fn generate_types_content() -> String {
    let decls = [
        Tool::decl(),
        CategoryCount::decl(),
        BlogPostId::decl(),
        BlogPost::decl(),
        SubscriberList::decl(),
        Subscriber::decl(),
        SubscribeRequest::decl(),
        SubscribedEmail::decl(),
        SubmissionReceipt::decl(),
        AdvertisingReceipt::decl(),
        ChatRequest::decl(),
        ChatResponse::decl(),
    ];

    let mut content = String::from(
        "// This file was generated by `generate_types`. Do not edit it by hand.\n\n",
    );
    for decl in decls {
        content.push_str("export ");
        content.push_str(&decl);
        content.push_str("\n\n");
    }
    content.trim_end().to_string() + "\n"
}

fn main() -> anyhow::Result<()> {
    let check = std::env::args().any(|arg| arg == "--check");
    let path = Path::new(OUTPUT);
    let content = generate_types_content();

    if check {
        let current = fs::read_to_string(path).unwrap_or_default();
        if current != content {
            anyhow::bail!("{OUTPUT} is out of date, run generate_types");
        }
        println!("{OUTPUT} is up to date");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {OUTPUT}"))?;
    println!("Wrote {OUTPUT}");
    Ok(())
}

use std::sync::Arc;

use db::{DBService, DBServiceError};
use services::services::{
    blog_feed::{BlogFeedClient, BlogFeedError},
    fan_data::FanDataset,
    newsletter::NewsletterService,
    tool_catalog::ToolCatalog,
};
use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Database(#[from] DBServiceError),
    #[error(transparent)]
    BlogFeed(#[from] BlogFeedError),
}

/// Everything the handlers share. Cheap to clone.
#[derive(Clone)]
pub struct Deployment {
    db: DBService,
    tools: Arc<ToolCatalog>,
    fan_data: Arc<FanDataset>,
    blog: BlogFeedClient,
    newsletter: NewsletterService,
}

impl Deployment {
    pub async fn new(config: &ServerConfig) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;
        let tools = ToolCatalog::load_or_empty(&config.tools_data_path);
        let fan_data = FanDataset::new(&config.fan_data_path);
        let blog = BlogFeedClient::new(config.blog_site_url.clone())?;

        info!(
            tools = tools.len(),
            fan_data = %config.fan_data_path.display(),
            blog = %blog.endpoint(),
            "Deployment ready"
        );
        Ok(Self::from_parts(db, tools, fan_data, blog))
    }

    pub fn from_parts(
        db: DBService,
        tools: ToolCatalog,
        fan_data: FanDataset,
        blog: BlogFeedClient,
    ) -> Self {
        let newsletter = NewsletterService::new(db.pool.clone());
        Self {
            db,
            tools: Arc::new(tools),
            fan_data: Arc::new(fan_data),
            blog,
            newsletter,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn tools(&self) -> &ToolCatalog {
        &self.tools
    }

    pub fn fan_data(&self) -> &FanDataset {
        &self.fan_data
    }

    pub fn blog(&self) -> &BlogFeedClient {
        &self.blog
    }

    pub fn newsletter(&self) -> &NewsletterService {
        &self.newsletter
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::content::{BlogPost, ContentKind, Entity, Experience, Project, Repository};
use crate::storage::Storage;

pub async fn run<S>(storage: Arc<S>, kind: ContentKind) -> Result<()>
where
    S: Storage + Send + Sync + 'static,
{
    match kind {
        ContentKind::Experience => print::<S, Experience>(storage).await,
        ContentKind::Project => print::<S, Project>(storage).await,
        ContentKind::Blog => print::<S, BlogPost>(storage).await,
    }
}

async fn print<S, E>(storage: Arc<S>) -> Result<()>
where
    S: Storage + Send + Sync + 'static,
    E: Entity,
{
    let items = Repository::<S, E>::new(storage)
        .list()
        .await
        .with_context(|| format!("listing {}", E::KIND.table()))?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

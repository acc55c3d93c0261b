pub mod access;
pub mod acl_alias_mapping;
pub mod l2vpn;
pub mod template;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::db::{NotFoundError, Store};
use crate::models::{RenderedConfig, ServiceApplyResponse};
use template::TemplateEngine;

/// What a service callback can read and render while it runs
pub struct ServiceContext<'a> {
    pub store: &'a Store,
    pub templates: &'a TemplateEngine,
}

/// A service point: turns a service instance into device configuration.
///
/// `create` is re-run from scratch on every create or update, and whatever it
/// returns replaces the configs the instance produced before.
#[async_trait]
pub trait ServiceCallback: Send + Sync {
    type Instance: Serialize + DeserializeOwned + Send + Sync;

    const SERVICE_TYPE: &'static str;

    fn key(instance: &Self::Instance) -> String;

    async fn create(
        &self,
        ctx: &ServiceContext<'_>,
        instance: &mut Self::Instance,
    ) -> Result<Vec<RenderedConfig>>;

    /// Release whatever `create` reserved outside the instance itself.
    /// Runs after the instance and its configs are removed, and when the
    /// first create of an instance fails before anything was committed.
    async fn delete(&self, _ctx: &ServiceContext<'_>, _instance: &Self::Instance) -> Result<()> {
        Ok(())
    }
}

/// Run the create callback for an instance and commit its configs
pub async fn apply<S: ServiceCallback>(
    service: &S,
    ctx: &ServiceContext<'_>,
    mut instance: S::Instance,
) -> Result<ServiceApplyResponse<S::Instance>> {
    let key = S::key(&instance);
    tracing::info!("Service create({}[{}])", S::SERVICE_TYPE, key);

    let existed = ctx
        .store
        .get_service_instance::<S::Instance>(S::SERVICE_TYPE, &key)
        .await?
        .is_some();

    let configs = match commit(service, ctx, &key, &mut instance).await {
        Ok(configs) => configs,
        Err(e) => {
            // A stored instance still owns its reservations; a new one must give them back
            if !existed {
                if let Err(undo) = service.delete(ctx, &instance).await {
                    tracing::warn!(
                        "Failed to undo {}[{}] after error: {:#}",
                        S::SERVICE_TYPE,
                        key,
                        undo
                    );
                }
            }
            return Err(e);
        }
    };

    tracing::info!(
        "Service {}[{}] committed {} device config(s)",
        S::SERVICE_TYPE,
        key,
        configs.len()
    );
    Ok(ServiceApplyResponse { service: instance, configs })
}

async fn commit<S: ServiceCallback>(
    service: &S,
    ctx: &ServiceContext<'_>,
    key: &str,
    instance: &mut S::Instance,
) -> Result<Vec<RenderedConfig>> {
    let configs = service.create(ctx, instance).await?;
    ctx.store
        .save_service_instance(S::SERVICE_TYPE, key, &*instance, &configs)
        .await?;
    Ok(configs)
}

/// Remove an instance and everything it produced
pub async fn remove<S: ServiceCallback>(service: &S, ctx: &ServiceContext<'_>, key: &str) -> Result<()> {
    let instance: S::Instance = ctx
        .store
        .get_service_instance(S::SERVICE_TYPE, key)
        .await?
        .ok_or_else(|| NotFoundError::new(S::SERVICE_TYPE, key))?;

    tracing::info!("Service delete({}[{}])", S::SERVICE_TYPE, key);
    ctx.store.delete_service_instance(S::SERVICE_TYPE, key).await?;
    service.delete(ctx, &instance).await
}

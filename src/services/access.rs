use anyhow::Result;
use async_trait::async_trait;

use crate::db::NotFoundError;
use crate::models::*;
use super::template::{TemplateVariables, ACCESS_TEMPLATE};
use super::{ServiceCallback, ServiceContext};

/// access-python service point: allocates a customer VLAN and renders the
/// access/trunk port configuration on one device.
pub struct AccessCallback {
    pub vlan_pool: String,
}

impl AccessCallback {
    pub fn new(vlan_pool: impl Into<String>) -> Self {
        Self { vlan_pool: vlan_pool.into() }
    }
}

fn allocation_owner(customer: &str) -> String {
    format!("/access-python[customer='{}']", customer)
}

#[async_trait]
impl ServiceCallback for AccessCallback {
    type Instance = AccessService;

    const SERVICE_TYPE: &'static str = service_type::ACCESS;

    fn key(instance: &AccessService) -> String {
        instance.customer.clone()
    }

    async fn create(
        &self,
        ctx: &ServiceContext<'_>,
        service: &mut AccessService,
    ) -> Result<Vec<RenderedConfig>> {
        let owner = allocation_owner(&service.customer);
        ctx.store.request_id(&self.vlan_pool, &owner, &service.customer).await?;

        let Some(vlan) = ctx.store.read_id(&self.vlan_pool, &service.customer).await? else {
            tracing::info!("VLAN not ready for customer {}", service.customer);
            service.vlan = None;
            return Ok(Vec::new());
        };
        service.vlan = Some(vlan);

        let location = ctx
            .store
            .get_location(&service.device)
            .await?
            .ok_or_else(|| NotFoundError::new("Location", &service.device))?;
        tracing::info!("custom_interface_description: {}", location.address);

        let mut vars = TemplateVariables::new();
        vars.add("VLAN", vlan);
        vars.add("ACCESS_GE_INTERFACE", &service.access_ge_interface);
        vars.add("TRUNK_GE_INTERFACE", &service.trunk_ge_interface);
        vars.add("ACCESS_INT_DESCRIPTION", &location.address);

        Ok(vec![ctx.templates.apply(ACCESS_TEMPLATE, &service.device, &vars)?])
    }

    async fn delete(&self, ctx: &ServiceContext<'_>, service: &AccessService) -> Result<()> {
        if ctx.store.release_id(&self.vlan_pool, &service.customer).await? {
            tracing::info!("Released VLAN of customer {}", service.customer);
        }
        Ok(())
    }
}

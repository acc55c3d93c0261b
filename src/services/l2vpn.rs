use anyhow::Result;
use async_trait::async_trait;

use crate::db::NotFoundError;
use crate::models::*;
use super::template::{TemplateVariables, L2VPN_TEMPLATE};
use super::{ServiceCallback, ServiceContext};

/// l2vpn service point: one pseudowire, rendered once per endpoint
pub struct L2vpnCallback;

/// `service-<id>-svc-to-<peer device>-<peer interface>-<peer vlan>`
fn iface_description(service_id: &str, peer: &L2vpnEndpoint) -> String {
    let vlan = peer.vlan_id.to_string();
    ["service", service_id, "svc", "to", &peer.device_id, &peer.interface_id, &vlan].join("-")
}

fn endpoint_vars(
    service: &L2vpnService,
    local: &L2vpnEndpoint,
    peer: &L2vpnEndpoint,
    qos_policy_name: &str,
) -> TemplateVariables {
    let mut vars = TemplateVariables::new();
    vars.add("DEVICE_NAME", &local.device_id);
    vars.add("VC_CLASS", &service.link.vc_class);
    vars.add("INTERFACE_ID", &local.interface_id);
    vars.add("SERVICE_ETHERNET_INSTANCE_ID", local.instance_id);
    vars.add("QOS_POLICY_NAME", qos_policy_name);
    vars.add("VLAN_ID", local.vlan_id);
    vars.add("REMOTE_IP", &peer.ip_address);
    vars.add("VC_ID", service.link.vc_id);
    vars.add("IFACE_DESCRIPTION", iface_description(&service.service_id, peer));
    vars
}

#[async_trait]
impl ServiceCallback for L2vpnCallback {
    type Instance = L2vpnService;

    const SERVICE_TYPE: &'static str = service_type::L2VPN;

    fn key(instance: &L2vpnService) -> String {
        instance.service_id.clone()
    }

    async fn create(
        &self,
        ctx: &ServiceContext<'_>,
        service: &mut L2vpnService,
    ) -> Result<Vec<RenderedConfig>> {
        let qos_id = &service.link.qos_service_id;
        let qos = ctx
            .store
            .get_qos_service(qos_id)
            .await?
            .ok_or_else(|| NotFoundError::new("QosService", qos_id))?;

        let ad = &service.access_device;
        let dd = &service.delivery_device;

        let access = endpoint_vars(service, ad, dd, &qos.policy_name);
        let delivery = endpoint_vars(service, dd, ad, &qos.policy_name);

        Ok(vec![
            ctx.templates.apply(L2VPN_TEMPLATE, &ad.device_id, &access)?,
            ctx.templates.apply(L2VPN_TEMPLATE, &dd.device_id, &delivery)?,
        ])
    }
}

mod acl_mappings;
mod devices;
mod id_pools;
mod inventory;
pub(crate) mod row_helpers;
mod service_instances;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::models::*;
use acl_mappings::AclMappingRepo;
use devices::DeviceRepo;
use id_pools::IdPoolRepo;
use inventory::{LocationRepo, QosServiceRepo};
use service_instances::ServiceInstanceRepo;

/// Typed error for "resource not found" — enables reliable downcast
/// in the API error handler instead of fragile string matching.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Store is the managed configuration tree. It delegates to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Single-connection in-memory store, used by tests
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")
    }

    // ========== Devices ==========

    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        DeviceRepo::list(&self.pool).await
    }

    pub async fn get_device(&self, name: &str) -> Result<Option<Device>> {
        DeviceRepo::get(&self.pool, name).await
    }

    pub async fn upsert_device(&self, req: &CreateDeviceRequest) -> Result<Device> {
        DeviceRepo::upsert(&self.pool, req).await
    }

    pub async fn delete_device(&self, name: &str) -> Result<()> {
        DeviceRepo::delete(&self.pool, name).await
    }

    // ========== QoS Services ==========

    pub async fn list_qos_services(&self) -> Result<Vec<QosService>> {
        QosServiceRepo::list(&self.pool).await
    }

    pub async fn get_qos_service(&self, id: &str) -> Result<Option<QosService>> {
        QosServiceRepo::get(&self.pool, id).await
    }

    pub async fn upsert_qos_service(&self, req: &CreateQosServiceRequest) -> Result<QosService> {
        QosServiceRepo::upsert(&self.pool, req).await
    }

    pub async fn delete_qos_service(&self, id: &str) -> Result<()> {
        QosServiceRepo::delete(&self.pool, id).await
    }

    // ========== Locations ==========

    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        LocationRepo::list(&self.pool).await
    }

    pub async fn get_location(&self, device: &str) -> Result<Option<Location>> {
        LocationRepo::get(&self.pool, device).await
    }

    pub async fn upsert_location(&self, req: &CreateLocationRequest) -> Result<Location> {
        LocationRepo::upsert(&self.pool, req).await
    }

    pub async fn delete_location(&self, device: &str) -> Result<()> {
        LocationRepo::delete(&self.pool, device).await
    }

    // ========== ID Pools ==========

    pub async fn list_id_pools(&self) -> Result<Vec<IdPool>> {
        IdPoolRepo::list(&self.pool).await
    }

    pub async fn get_id_pool(&self, name: &str) -> Result<Option<IdPool>> {
        IdPoolRepo::get(&self.pool, name).await
    }

    pub async fn create_id_pool(&self, req: &CreateIdPoolRequest) -> Result<IdPool> {
        IdPoolRepo::create(&self.pool, req).await
    }

    pub async fn list_id_allocations(&self, pool: &str) -> Result<Vec<IdAllocation>> {
        IdPoolRepo::list_allocations(&self.pool, pool).await
    }

    pub async fn request_id(&self, pool: &str, owner: &str, allocation_id: &str) -> Result<Option<i64>> {
        IdPoolRepo::request(&self.pool, pool, owner, allocation_id).await
    }

    pub async fn read_id(&self, pool: &str, allocation_id: &str) -> Result<Option<i64>> {
        IdPoolRepo::read(&self.pool, pool, allocation_id).await
    }

    pub async fn release_id(&self, pool: &str, allocation_id: &str) -> Result<bool> {
        IdPoolRepo::release(&self.pool, pool, allocation_id).await
    }

    // ========== Service Instances ==========

    pub async fn list_service_instances<T: DeserializeOwned>(&self, service_type: &str) -> Result<Vec<T>> {
        ServiceInstanceRepo::list(&self.pool, service_type).await
    }

    pub async fn get_service_instance<T: DeserializeOwned>(
        &self,
        service_type: &str,
        key: &str,
    ) -> Result<Option<T>> {
        ServiceInstanceRepo::get(&self.pool, service_type, key).await
    }

    pub async fn save_service_instance<T: Serialize>(
        &self,
        service_type: &str,
        key: &str,
        instance: &T,
        configs: &[RenderedConfig],
    ) -> Result<()> {
        ServiceInstanceRepo::save(&self.pool, service_type, key, instance, configs).await
    }

    pub async fn delete_service_instance(&self, service_type: &str, key: &str) -> Result<()> {
        ServiceInstanceRepo::delete(&self.pool, service_type, key).await
    }

    pub async fn list_device_configs(&self, device: &str) -> Result<Vec<DeviceConfig>> {
        ServiceInstanceRepo::list_device_configs(&self.pool, device).await
    }

    // ========== ACL Alias Mappings ==========

    pub async fn list_acl_mappings(&self, device: &str) -> Result<Vec<DeviceAclMapping>> {
        AclMappingRepo::list(&self.pool, device).await
    }

    pub async fn replace_acl_mappings(&self, device: &str, mappings: &[AclMapping]) -> Result<()> {
        AclMappingRepo::replace(&self.pool, device, mappings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlan_pool(start: i64, end: i64) -> CreateIdPoolRequest {
        CreateIdPoolRequest { name: "vlans".into(), range_start: start, range_end: end }
    }

    #[tokio::test]
    async fn test_device_upsert_and_delete() {
        let store = Store::in_memory().await.unwrap();
        let req = CreateDeviceRequest {
            name: "ce0".into(),
            address: "10.0.0.1".into(),
            port: None,
            ssh_user: Some("admin".into()),
            ssh_pass: Some("secret".into()),
        };
        let dev = store.upsert_device(&req).await.unwrap();
        assert_eq!(dev.port, 22);
        assert_eq!(dev.ssh_user.as_deref(), Some("admin"));

        let moved = CreateDeviceRequest { address: "10.0.0.2".into(), port: Some(2022), ..req };
        let dev = store.upsert_device(&moved).await.unwrap();
        assert_eq!(dev.address, "10.0.0.2");
        assert_eq!(dev.port, 2022);
        assert_eq!(store.list_devices().await.unwrap().len(), 1);

        store.delete_device("ce0").await.unwrap();
        assert!(store.get_device("ce0").await.unwrap().is_none());

        let err = store.delete_device("ce0").await.unwrap_err();
        assert!(err.downcast_ref::<NotFoundError>().is_some());
    }

    #[tokio::test]
    async fn test_id_allocation_is_idempotent_per_allocation() {
        let store = Store::in_memory().await.unwrap();
        store.create_id_pool(&vlan_pool(100, 101)).await.unwrap();

        let a = store.request_id("vlans", "/access-python[customer='a']", "a").await.unwrap();
        let again = store.request_id("vlans", "/access-python[customer='a']", "a").await.unwrap();
        let b = store.request_id("vlans", "/access-python[customer='b']", "b").await.unwrap();
        assert_eq!(a, Some(100));
        assert_eq!(again, Some(100));
        assert_eq!(b, Some(101));
        assert_eq!(store.read_id("vlans", "b").await.unwrap(), Some(101));

        // exhausted
        let c = store.request_id("vlans", "/access-python[customer='c']", "c").await.unwrap();
        assert_eq!(c, None);
        assert_eq!(store.read_id("vlans", "c").await.unwrap(), None);

        // released IDs are reused
        assert!(store.release_id("vlans", "a").await.unwrap());
        assert!(!store.release_id("vlans", "a").await.unwrap());
        let c = store.request_id("vlans", "/access-python[customer='c']", "c").await.unwrap();
        assert_eq!(c, Some(100));

        let allocations = store.list_id_allocations("vlans").await.unwrap();
        let owners: Vec<&str> = allocations.iter().map(|a| a.allocation_id.as_str()).collect();
        assert_eq!(owners, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_request_from_missing_pool() {
        let store = Store::in_memory().await.unwrap();
        assert_eq!(store.request_id("nope", "owner", "x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_service_instance_replaces_configs() {
        let store = Store::in_memory().await.unwrap();
        let first = vec![
            RenderedConfig { device: "pe0".into(), template: "t".into(), config: "one".into() },
            RenderedConfig { device: "pe1".into(), template: "t".into(), config: "two".into() },
        ];
        store.save_service_instance("l2vpn", "s1", &serde_json::json!({"v": 1}), &first).await.unwrap();
        assert_eq!(store.list_device_configs("pe1").await.unwrap().len(), 1);

        let second = vec![
            RenderedConfig { device: "pe0".into(), template: "t".into(), config: "three".into() },
        ];
        store.save_service_instance("l2vpn", "s1", &serde_json::json!({"v": 2}), &second).await.unwrap();
        assert!(store.list_device_configs("pe1").await.unwrap().is_empty());
        let pe0 = store.list_device_configs("pe0").await.unwrap();
        assert_eq!(pe0.len(), 1);
        assert_eq!(pe0[0].config, "three");

        let stored: Option<serde_json::Value> = store.get_service_instance("l2vpn", "s1").await.unwrap();
        assert_eq!(stored, Some(serde_json::json!({"v": 2})));

        store.delete_service_instance("l2vpn", "s1").await.unwrap();
        assert!(store.list_device_configs("pe0").await.unwrap().is_empty());
        assert!(store.delete_service_instance("l2vpn", "s1").await.is_err());
    }

    #[tokio::test]
    async fn test_acl_mappings_replace() {
        let store = Store::in_memory().await.unwrap();
        let first = vec![
            AclMapping { port: 179, protocol: "bgp".into() },
            AclMapping { port: 23, protocol: "telnet".into() },
        ];
        store.replace_acl_mappings("ce0", &first).await.unwrap();
        let stored = store.list_acl_mappings("ce0").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].port, 23);

        store.replace_acl_mappings("ce0", &first[..1]).await.unwrap();
        let stored = store.list_acl_mappings("ce0").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].protocol, "bgp");
    }
}

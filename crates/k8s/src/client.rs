/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::path::Path;

use billet_ipam::{
    IpPool, OwnerRef, PodDetails, PodRetriever, PoolStore, StatefulSetRetriever, StoreError,
};
use eyre::WrapErr;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::api::PostParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};

use crate::crd::IPPool;

/// Apiserver-backed implementation of the allocator's collaborator
/// traits, tied to one named `IPPool` resource.
pub struct KubeClient {
    client: Client,
    pool_name: String,
}

impl KubeClient {
    /// Connects through an explicit kubeconfig file.
    pub async fn from_kubeconfig(
        path: &Path,
        pool_name: impl Into<String>,
    ) -> Result<Self, eyre::Report> {
        let kubeconfig = Kubeconfig::read_from(path)
            .wrap_err_with(|| format!("reading kubeconfig {}", path.display()))?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .wrap_err("loading kubeconfig")?;
        let client = Client::try_from(config).wrap_err("building kubernetes client")?;
        Ok(KubeClient {
            client,
            pool_name: pool_name.into(),
        })
    }

    /// Connects through the ambient environment: in-cluster service
    /// account when present, the default kubeconfig otherwise.
    pub async fn infer(pool_name: impl Into<String>) -> Result<Self, eyre::Report> {
        let client = Client::try_default()
            .await
            .wrap_err("building kubernetes client from the ambient environment")?;
        Ok(KubeClient {
            client,
            pool_name: pool_name.into(),
        })
    }

    fn pools(&self) -> Api<IPPool> {
        Api::all(self.client.clone())
    }
}

fn store_error(err: kube::Error) -> StoreError {
    match err {
        kube::Error::Api(response) if response.code == 409 => StoreError::VersionConflict,
        other => StoreError::Api(eyre::Report::new(other)),
    }
}

fn pod_details(pod: Pod) -> PodDetails {
    PodDetails {
        host_ip: pod.status.and_then(|status| status.host_ip),
        owners: pod
            .metadata
            .owner_references
            .unwrap_or_default()
            .into_iter()
            .map(|owner| OwnerRef {
                kind: owner.kind,
                name: owner.name,
            })
            .collect(),
    }
}

#[async_trait::async_trait]
impl PoolStore for KubeClient {
    async fn get_pool(&self) -> Result<IpPool, StoreError> {
        let resource = self.pools().get(&self.pool_name).await.map_err(store_error)?;
        let pool = IpPool::from(&resource);
        tracing::debug!(pool = %self.pool_name, version = ?pool.version, "fetched pool resource");
        Ok(pool)
    }

    async fn update_pool(&self, pool: &IpPool) -> Result<(), StoreError> {
        let resource = IPPool::from_pool(&self.pool_name, pool);
        self.pools()
            .replace(&self.pool_name, &PostParams::default(), &resource)
            .await
            .map_err(store_error)?;
        tracing::debug!(pool = %self.pool_name, version = ?pool.version, "persisted pool resource");
        Ok(())
    }
}

#[async_trait::async_trait]
impl PodRetriever for KubeClient {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<PodDetails>, StoreError> {
        let api = Api::<Pod>::namespaced(self.client.clone(), namespace);
        let pod = api.get_opt(name).await.map_err(store_error)?;
        Ok(pod.map(pod_details))
    }
}

#[async_trait::async_trait]
impl StatefulSetRetriever for KubeClient {
    async fn stateful_set_exists(&self, namespace: &str, name: &str) -> Result<bool, StoreError> {
        let api = Api::<StatefulSet>::namespaced(self.client.clone(), namespace);
        let set = api.get_opt(name).await.map_err(store_error)?;
        Ok(set.is_some())
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::PodStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
    use kube::core::Status;

    use super::*;

    #[test]
    fn http_409_maps_to_a_version_conflict() {
        let conflict = kube::Error::Api(
            Status::failure("the object has been modified", "Conflict")
                .with_code(409)
                .boxed(),
        );
        assert!(matches!(store_error(conflict), StoreError::VersionConflict));

        let forbidden =
            kube::Error::Api(Status::failure("no access", "Forbidden").with_code(403).boxed());
        assert!(matches!(store_error(forbidden), StoreError::Api(_)));
    }

    #[test]
    fn pod_details_extracts_host_and_lineage() {
        let pod = Pod {
            metadata: kube::core::ObjectMeta {
                owner_references: Some(vec![OwnerReference {
                    kind: "StatefulSet".to_string(),
                    name: "db-st".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            status: Some(PodStatus {
                host_ip: Some("10.180.4.7".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let details = pod_details(pod);
        assert_eq!(details.host_ip.as_deref(), Some("10.180.4.7"));
        assert!(details.owned_by_stateful_set());

        let empty = pod_details(Pod::default());
        assert_eq!(empty.host_ip, None);
        assert!(empty.owners.is_empty());
    }
}

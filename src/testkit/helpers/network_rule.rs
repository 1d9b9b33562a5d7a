use crate::error::SdkError;
use crate::sdk::network_rules::{CreateNetworkRuleOptions, NetworkRule, NetworkRuleMode, NetworkRuleType};
use crate::sdk::{Client, DropOptions, SchemaObjectIdentifier};
use crate::testkit::ids::IdsGenerator;

/// Creates network rules for tests; callers drop them with [`NetworkRuleHelper::drop`].
#[derive(Clone)]
pub struct NetworkRuleHelper {
    client: Client,
    ids: IdsGenerator,
}

impl NetworkRuleHelper {
    pub fn new(client: Client, ids: IdsGenerator) -> Self {
        Self { client, ids }
    }

    pub async fn create(&self) -> Result<NetworkRule, SdkError> {
        self.create_egress_with_identifier(self.ids.random_schema_object_identifier())
            .await
    }

    pub async fn create_ingress(&self) -> Result<NetworkRule, SdkError> {
        self.create_with_options(&CreateNetworkRuleOptions::new(
            self.ids.random_schema_object_identifier(),
            NetworkRuleType::Ipv4,
            Vec::new(),
            NetworkRuleMode::Ingress,
        ))
        .await
    }

    pub async fn create_egress_with_identifier(&self, id: SchemaObjectIdentifier) -> Result<NetworkRule, SdkError> {
        self.create_with_options(&CreateNetworkRuleOptions::new(
            id,
            NetworkRuleType::HostPort,
            Vec::new(),
            NetworkRuleMode::Egress,
        ))
        .await
    }

    /// Create, then read the rule back by its identifier.
    pub async fn create_with_options(&self, opts: &CreateNetworkRuleOptions) -> Result<NetworkRule, SdkError> {
        let rules = self.client.network_rules();
        rules.create(opts).await?;
        rules.show_by_id(opts.name()).await
    }

    pub async fn drop(&self, id: &SchemaObjectIdentifier) -> Result<(), SdkError> {
        self.client
            .network_rules()
            .drop(&DropOptions::new(id.clone()).with_if_exists(true))
            .await
    }
}

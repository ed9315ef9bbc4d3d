//! IAM role, instance profile and user deletion
//!
//! IAM refuses to delete principals that still have attached policies,
//! profile memberships or access keys, so each delete strips those first.
//! A failed step on an attachment names the attachment's owner as parent.

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::{DeleteFailure, ignore_not_found};
use aws_sdk_iam::Client;
use tagsweep_common::ResourceType;
use tracing::{debug, info};

/// IAM client for principal teardown
pub struct IamClient {
    client: Client,
}

impl FromAwsContext for IamClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

impl IamClient {
    /// Delete a role after removing it from profiles and dropping its policies
    pub async fn delete_role(&self, call: &CallContext, role_name: &str) -> Result<(), DeleteFailure> {
        info!(role_name = %role_name, "Deleting IAM role");

        let profiles = call
            .run(
                self.client
                    .list_instance_profiles_for_role()
                    .role_name(role_name)
                    .send(),
            )
            .await?;
        for profile in profiles.instance_profiles() {
            let profile_name = profile.instance_profile_name();
            debug!(role_name = %role_name, profile_name = %profile_name, "Removing role from instance profile");
            call.run(
                self.client
                    .remove_role_from_instance_profile()
                    .instance_profile_name(profile_name)
                    .role_name(role_name)
                    .send(),
            )
            .await
            .map_err(|e| DeleteFailure::with_parent(e, ResourceType::IamInstanceProfile, profile_name))?;
        }

        let inline = call
            .run(self.client.list_role_policies().role_name(role_name).send())
            .await?;
        for policy_name in inline.policy_names() {
            debug!(role_name = %role_name, policy = %policy_name, "Deleting inline role policy");
            ignore_not_found(
                call.run(
                    self.client
                        .delete_role_policy()
                        .role_name(role_name)
                        .policy_name(policy_name)
                        .send(),
                )
                .await,
            )?;
        }

        let attached = call
            .run(
                self.client
                    .list_attached_role_policies()
                    .role_name(role_name)
                    .send(),
            )
            .await?;
        for policy_arn in attached.attached_policies().iter().filter_map(|p| p.policy_arn()) {
            debug!(role_name = %role_name, policy = %policy_arn, "Detaching role policy");
            ignore_not_found(
                call.run(
                    self.client
                        .detach_role_policy()
                        .role_name(role_name)
                        .policy_arn(policy_arn)
                        .send(),
                )
                .await,
            )?;
        }

        call.run(self.client.delete_role().role_name(role_name).send())
            .await?;
        Ok(())
    }

    /// Delete an instance profile after removing its roles
    pub async fn delete_instance_profile(
        &self,
        call: &CallContext,
        profile_name: &str,
    ) -> Result<(), DeleteFailure> {
        info!(profile_name = %profile_name, "Deleting IAM instance profile");

        let response = call
            .run(
                self.client
                    .get_instance_profile()
                    .instance_profile_name(profile_name)
                    .send(),
            )
            .await?;
        let roles: Vec<String> = response
            .instance_profile()
            .map(|p| p.roles().iter().map(|r| r.role_name().to_string()).collect())
            .unwrap_or_default();

        for role_name in roles {
            debug!(profile_name = %profile_name, role_name = %role_name, "Removing role from instance profile");
            call.run(
                self.client
                    .remove_role_from_instance_profile()
                    .instance_profile_name(profile_name)
                    .role_name(&role_name)
                    .send(),
            )
            .await
            .map_err(|e| DeleteFailure::with_parent(e, ResourceType::IamRole, role_name))?;
        }

        call.run(
            self.client
                .delete_instance_profile()
                .instance_profile_name(profile_name)
                .send(),
        )
        .await?;
        Ok(())
    }

    /// Delete a user after removing policies, access keys and login profile
    pub async fn delete_user(&self, call: &CallContext, user_name: &str) -> Result<(), DeleteFailure> {
        info!(user_name = %user_name, "Deleting IAM user");

        let inline = call
            .run(self.client.list_user_policies().user_name(user_name).send())
            .await?;
        for policy_name in inline.policy_names() {
            ignore_not_found(
                call.run(
                    self.client
                        .delete_user_policy()
                        .user_name(user_name)
                        .policy_name(policy_name)
                        .send(),
                )
                .await,
            )?;
        }

        let attached = call
            .run(
                self.client
                    .list_attached_user_policies()
                    .user_name(user_name)
                    .send(),
            )
            .await?;
        for policy_arn in attached.attached_policies().iter().filter_map(|p| p.policy_arn()) {
            ignore_not_found(
                call.run(
                    self.client
                        .detach_user_policy()
                        .user_name(user_name)
                        .policy_arn(policy_arn)
                        .send(),
                )
                .await,
            )?;
        }

        let keys = call
            .run(self.client.list_access_keys().user_name(user_name).send())
            .await?;
        for key_id in keys.access_key_metadata().iter().filter_map(|k| k.access_key_id()) {
            debug!(user_name = %user_name, "Deleting access key");
            ignore_not_found(
                call.run(
                    self.client
                        .delete_access_key()
                        .user_name(user_name)
                        .access_key_id(key_id)
                        .send(),
                )
                .await,
            )?;
        }

        // Most programmatic users have no login profile
        ignore_not_found(
            call.run(self.client.delete_login_profile().user_name(user_name).send())
                .await,
        )?;

        call.run(self.client.delete_user().user_name(user_name).send())
            .await?;
        Ok(())
    }
}

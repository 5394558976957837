use serde_json::json;
use uuid::Uuid;

use super::{Actions, procedures};
use crate::error::{MailroomError, Result};
use crate::model::{KycSubmission, ProfileUpdate, UserAuthData, UserFullDetails, UserProfile};

impl Actions {
    /// Profile, KYC, subscription and mailbox for one user
    pub async fn get_user_full_details(&self, user_id: Uuid) -> Result<UserFullDetails> {
        self.invoke(
            procedures::GET_USER_FULL_DETAILS,
            json!({ "input_user_id": user_id }),
        )
        .await
    }

    /// Derived permissions struct, see [`crate::cache`]
    pub async fn get_user_auth_data(&self, user_id: Uuid) -> Result<UserAuthData> {
        self.invoke(
            procedures::GET_USER_AUTH_DATA,
            json!({ "input_user_id": user_id }),
        )
        .await
    }

    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        if update.is_empty() {
            return Err(MailroomError::InvalidInput("Nothing to update".into()));
        }

        self.invoke(
            procedures::UPDATE_USER_PROFILE,
            json!({
                "input_user_id": user_id,
                "input_first_name": update.first_name,
                "input_last_name": update.last_name,
                "input_phone": update.phone,
                "input_avatar_url": update.avatar_url,
            }),
        )
        .await
    }

    pub async fn submit_kyc(&self, user_id: Uuid, submission: &KycSubmission) -> Result<()> {
        self.invoke_unit(
            procedures::SUBMIT_KYC,
            json!({
                "input_user_id": user_id,
                "input_id_type": submission.id_type,
                "input_id_number": submission.id_number,
                "input_id_front_url": submission.id_front_url,
                "input_id_back_url": submission.id_back_url,
                "input_selfie_url": submission.selfie_url,
            }),
        )
        .await
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{AddressList, AddressRequest, UpdateProfileRequest},
    entity::{
        user_addresses::{
            self, ActiveModel as AddressActive, Column as AddressCol, Entity as UserAddresses,
        },
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, User},
    response::{ApiResponse, Meta},
    services::auth_service::{find_user_by_email, hash_password},
    state::AppState,
    validation,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", model.into(), Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();

    if let Some(name) = payload.name {
        validation::name(&name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        validation::email(&email)?;
        let email = validation::normalize_email(&email);
        let taken = find_user_by_email(state, &email)
            .await?
            .is_some_and(|other| other.id != user.user_id);
        if taken {
            return Err(AppError::BadRequest("Email already in use".into()));
        }
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        validation::password(&password)?;
        active.password_hash = Set(hash_password(&password)?);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success("Profile updated", updated.into(), Some(Meta::empty())))
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = UserAddresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();

    Ok(ApiResponse::success("OK", AddressList { items }, Some(Meta::empty())))
}

fn validate_address(payload: &AddressRequest) -> AppResult<()> {
    validation::min_len("Zipcode", &payload.zipcode, 8)?;
    validation::min_len("Street", &payload.street, 3)?;
    validation::min_len("Number", &payload.number, 1)?;
    validation::min_len("City", &payload.city, 3)?;
    validation::min_len("State", &payload.state, 2)?;
    validation::min_len("Country", &payload.country, 2)?;
    Ok(())
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    validate_address(&payload)?;

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        zipcode: Set(payload.zipcode),
        street: Set(payload.street),
        number: Set(payload.number),
        city: Set(payload.city),
        state: Set(payload.state),
        country: Set(payload.country),
        complement: Set(payload.complement.unwrap_or_default()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success("Address created", address.into(), Some(Meta::empty())))
}

/// Load an address only if it belongs to `user_id`.
pub async fn find_owned_address(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<user_addresses::Model> {
    UserAddresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(id))
                .add(AddressCol::UserId.eq(user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    validate_address(&payload)?;
    let existing = find_owned_address(state, user.user_id, id).await?;

    let mut active: AddressActive = existing.into();
    active.zipcode = Set(payload.zipcode);
    active.street = Set(payload.street);
    active.number = Set(payload.number);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    active.country = Set(payload.country);
    active.complement = Set(payload.complement.unwrap_or_default());
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Address updated", updated.into(), Some(Meta::empty())))
}

pub async fn delete_address(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let result = UserAddresses::delete_many()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> AddressRequest {
        AddressRequest {
            zipcode: "01310100".into(),
            street: "Avenida Paulista".into(),
            number: "1000".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            country: "BR".into(),
            complement: None,
        }
    }

    #[test]
    fn valid_address_passes() {
        assert!(validate_address(&address()).is_ok());
    }

    #[test]
    fn short_fields_are_rejected() {
        let mut short_zip = address();
        short_zip.zipcode = "0131".into();
        assert!(validate_address(&short_zip).is_err());

        let mut no_number = address();
        no_number.number = "".into();
        assert!(validate_address(&no_number).is_err());

        let mut short_state = address();
        short_state.state = "S".into();
        assert!(validate_address(&short_state).is_err());
    }
}

//! Profile handlers

use crate::core::auth::ensure_owner;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{
    Education, Experience, Message, Profile, ProfileDetails, ProfileView, Social,
};
use crate::core::validation::{non_blank, split_list, Payload, Validator};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

const NO_PROFILES: Error = Error::NotFound {
    resource: "profiles",
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    /// Comma separated
    pub skills: Option<String>,
    pub bio: Option<String>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub current_date: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub current_date: Option<bool>,
    pub description: Option<String>,
}

/// Apply `change` to the caller's profile once ownership is confirmed.
///
/// The account is resolved first: a token outlives a deleted account.
async fn change_own_profile<F>(state: &AppState, ctx: &Ctx, mut change: F) -> Result<Profile>
where
    F: FnMut(&mut Profile) -> Result<()>,
{
    state.store.require_user(ctx.user_id()).await?;
    state
        .store
        .modify_profile(ctx.user_id(), |profile| {
            ensure_owner(profile, ctx)?;
            change(profile)
        })
        .await?
        .ok_or(NO_PROFILES)
}

/// GET /api/profile/me
pub async fn my_profile(State(state): State<AppState>, ctx: Ctx) -> Result<Json<ProfileView>> {
    let view = state
        .store
        .find_profile_view(ctx.user_id())
        .await?
        .ok_or(NO_PROFILES)?;
    Ok(Json(view))
}

/// POST /api/profile
pub async fn upsert_profile(
    State(state): State<AppState>,
    ctx: Ctx,
    Payload(req): Payload<ProfileRequest>,
) -> Result<Json<Profile>> {
    let mut v = Validator::new();
    let status = v.not_empty("status", req.status.as_deref(), "Status is a required field!");
    let skills = v.not_empty("skills", req.skills.as_deref(), "Skills is a required field!");
    v.finish()?;

    let details = ProfileDetails {
        website: non_blank(req.website),
        location: non_blank(req.location),
        status,
        skills: split_list(&skills),
        bio: non_blank(req.bio),
        experience: Vec::new(),
        education: Vec::new(),
        social: Social {
            youtube: non_blank(req.youtube),
            twitter: non_blank(req.twitter),
            facebook: non_blank(req.facebook),
            instagram: non_blank(req.instagram),
            github: non_blank(req.github),
        },
    };

    state.store.require_user(ctx.user_id()).await?;

    let update = |profile: &mut Profile| -> Result<()> {
        ensure_owner(profile, &ctx)?;
        profile.apply(details.clone());
        Ok(())
    };
    let profile = match state.store.modify_profile(ctx.user_id(), update).await? {
        Some(updated) => updated,
        None => {
            let fresh = Profile::new(ctx.user_id(), details.clone());
            if state.store.insert_profile(&fresh).await? {
                fresh
            } else {
                // Another request created it first
                state
                    .store
                    .modify_profile(ctx.user_id(), update)
                    .await?
                    .ok_or(NO_PROFILES)?
            }
        }
    };

    info!("POST /api/profile - {}", ctx.user_id());
    Ok(Json(profile))
}

/// GET /api/profile/profiles
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>> {
    Ok(Json(state.store.list_profile_views().await?))
}

/// GET /api/profile/user/{user_id}
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>> {
    let view = state
        .store
        .find_profile_view(&user_id)
        .await?
        .ok_or(NO_PROFILES)?;
    Ok(Json(view))
}

/// DELETE /api/profile
pub async fn delete_account(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Message>> {
    state.store.delete_account(ctx.user_id()).await?;

    info!("DELETE /api/profile - {}", ctx.user_id());
    Ok(Json(Message::new("User was successfully removed!")))
}

/// PUT /api/profile/experience
pub async fn add_experience(
    State(state): State<AppState>,
    ctx: Ctx,
    Payload(req): Payload<ExperienceRequest>,
) -> Result<Json<Profile>> {
    let mut v = Validator::new();
    let title = v.not_empty("title", req.title.as_deref(), "Title is a required field!");
    let company = v.not_empty("company", req.company.as_deref(), "Company is a required field!");
    let from_date = v.date("fromDate", req.from_date.as_deref(), "From Date is a required field!");
    let to_date = v.optional_date("toDate", req.to_date.as_deref(), "To Date must be a valid date!");
    v.finish()?;

    let experience = Experience {
        id: Uuid::new_v4().to_string(),
        title,
        company,
        location: non_blank(req.location),
        from_date,
        to_date,
        current_date: req.current_date.unwrap_or(false),
        description: non_blank(req.description),
    };
    let profile = change_own_profile(&state, &ctx, |profile| {
        profile.add_experience(experience.clone());
        Ok(())
    })
    .await?;

    Ok(Json(profile))
}

/// PUT /api/profile/education
pub async fn add_education(
    State(state): State<AppState>,
    ctx: Ctx,
    Payload(req): Payload<EducationRequest>,
) -> Result<Json<Profile>> {
    let mut v = Validator::new();
    let school = v.not_empty("school", req.school.as_deref(), "School is a required field!");
    let degree = v.not_empty("degree", req.degree.as_deref(), "Degree is a required field!");
    let field_of_study = v.not_empty(
        "fieldOfStudy",
        req.field_of_study.as_deref(),
        "Fields Of Study is a required field!",
    );
    let from_date = v.date("fromDate", req.from_date.as_deref(), "From Date is a required field!");
    let to_date = v.optional_date("toDate", req.to_date.as_deref(), "To Date must be a valid date!");
    v.finish()?;

    let education = Education {
        id: Uuid::new_v4().to_string(),
        school,
        degree,
        field_of_study,
        from_date,
        to_date,
        current_date: req.current_date.unwrap_or(false),
        description: non_blank(req.description),
    };
    let profile = change_own_profile(&state, &ctx, |profile| {
        profile.add_education(education.clone());
        Ok(())
    })
    .await?;

    Ok(Json(profile))
}

/// DELETE /api/profile/experience/{exp_id}
pub async fn delete_experience(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>> {
    let profile =
        change_own_profile(&state, &ctx, |profile| profile.remove_experience(&exp_id)).await?;

    Ok(Json(profile))
}

/// DELETE /api/profile/education/{edu_id}
pub async fn delete_education(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>> {
    let profile =
        change_own_profile(&state, &ctx, |profile| profile.remove_education(&edu_id)).await?;

    Ok(Json(profile))
}

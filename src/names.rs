use crate::models::UserProfile;
use std::collections::BTreeMap;

pub fn display_name_from_email(email: &str) -> String {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}

/// Profile name, else email local part, else the raw id.
pub fn display_name(profile: Option<&UserProfile>, user_id: &str) -> String {
    let Some(profile) = profile else {
        return user_id.to_string();
    };
    match profile.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let from_email = display_name_from_email(&profile.email);
            if from_email.is_empty() {
                user_id.to_string()
            } else {
                from_email
            }
        }
    }
}

/// Resolves each id once so the aggregation layer can work from a plain map.
pub fn resolve_names<'a>(
    profiles: &BTreeMap<String, UserProfile>,
    user_ids: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, String> {
    user_ids
        .into_iter()
        .map(|id| (id.to_string(), display_name(profiles.get(id), id)))
        .collect()
}

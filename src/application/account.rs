use crate::domain::forms::{SignInForm, SignUpForm, UpdateEmailForm};
use crate::domain::{NewAccount, Principal, Session, SessionToken};

use super::dependencies::{ServiceDependencies, resolve_principal};
use super::errors::{ApplicationError, Result};

/// サインインする
///
/// フォーム検証に失敗した場合はバックエンドを呼ばずに返す。
/// 認証情報が一致しない場合はセッションを作らない。
pub async fn sign_in(deps: &ServiceDependencies, form: SignInForm) -> Result<Session> {
    form.validate().map_err(ApplicationError::Validation)?;

    tracing::info!(email = %form.email, "Attempting sign-in");

    let session = deps
        .auth
        .sign_in_with_password(&form.email, &form.password)
        .await
        .inspect_err(|e| tracing::info!(email = %form.email, "Sign-in failed: {}", e))?;

    tracing::info!(user_id = %session.principal.id, "Sign-in successful");
    Ok(session)
}

/// 新規登録する
pub async fn sign_up(deps: &ServiceDependencies, form: SignUpForm) -> Result<Principal> {
    form.validate().map_err(ApplicationError::Validation)?;

    let principal = deps
        .auth
        .sign_up(NewAccount {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password: form.password,
        })
        .await?;

    tracing::info!(user_id = %principal.id, "User registered");
    Ok(principal)
}

/// サインアウトする
pub async fn sign_out(deps: &ServiceDependencies, session: Option<&SessionToken>) -> Result<()> {
    let token = session.ok_or(ApplicationError::NotAuthenticated)?;
    deps.auth.sign_out(token).await?;
    Ok(())
}

/// 現在の利用者のメールアドレスを変更する
pub async fn update_email(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
    form: UpdateEmailForm,
) -> Result<Principal> {
    form.validate().map_err(ApplicationError::Validation)?;

    let principal = resolve_principal(deps, session).await?;

    let updated = deps.auth.update_email(principal.id, &form.email).await?;

    tracing::info!(user_id = %updated.id, "Email updated");
    Ok(updated)
}

/// 現在の利用者のアカウントを削除する
pub async fn delete_account(
    deps: &ServiceDependencies,
    session: Option<&SessionToken>,
) -> Result<()> {
    let principal = resolve_principal(deps, session).await?;

    deps.auth.delete_user(principal.id).await?;

    tracing::info!(user_id = %principal.id, "Account deleted");
    Ok(())
}

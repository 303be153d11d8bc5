use crate::domain::forms::{Field, ValidationIssue};

/// 翻訳キー
///
/// キー文字列はロケールファイル（JSON）のキーと一致する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // サインイン
    ValidationPasswordMinLength,
    ValidationPasswordMaxLength,
    ValidationEmailRequired,
    ValidationEmailInvalid,
    SigninErrorPrefix,
    SigninSuccessMessage,

    // 新規登録
    SignupValidationFirstNameRequired,
    SignupValidationFirstNameMaxLength,
    SignupValidationLastNameRequired,
    SignupValidationLastNameMaxLength,
    SignupValidationPasswordMinLength,
    SignupValidationPasswordMaxLength,
    SignupValidationEmailRequired,
    SignupValidationEmailInvalid,
    SignupErrorMissingFields,
    SignupErrorAlreadyRegistered,
    SignupSuccessMessage,

    // マイページ
    DashboardValidationEmailRequired,
    DashboardValidationEmailInvalid,
    DashboardErrorMissingEmail,
    DashboardErrorNoUserDataShort,
    DashboardErrorNoUserData,
    DashboardErrorUnknown,
    DashboardErrorEmailUpdateFailedPrefix,
    DashboardErrorEmailUnexpected,
    DashboardErrorTryAgain,
    DashboardSuccessEmailUpdated,
    DashboardErrorDeleteFailed,

    // 通知
    NotificationErrorUserNotFound,

    // 書籍・予約
    ErrorNotAuthenticated,
    ErrorReservationVerificationFailed,
    ErrorReservationNotAllowed,
    ErrorReservationFailed,
    ErrorBookNotFound,
    ErrorMissingRequiredFields,
    ErrorInvalidImageUrl,
    ErrorInvalidRequestBody,
    ErrorInvalidReservationId,
    ErrorUnknown,
    ErrorGeneric,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::ValidationPasswordMinLength => "validation_password_min_length",
            MessageKey::ValidationPasswordMaxLength => "validation_password_max_length",
            MessageKey::ValidationEmailRequired => "validation_email_required",
            MessageKey::ValidationEmailInvalid => "validation_email_invalid",
            MessageKey::SigninErrorPrefix => "signin_error_prefix",
            MessageKey::SigninSuccessMessage => "signin_success_message",
            MessageKey::SignupValidationFirstNameRequired => {
                "signup_validation_first_name_required"
            }
            MessageKey::SignupValidationFirstNameMaxLength => {
                "signup_validation_first_name_max_length"
            }
            MessageKey::SignupValidationLastNameRequired => "signup_validation_last_name_required",
            MessageKey::SignupValidationLastNameMaxLength => {
                "signup_validation_last_name_max_length"
            }
            MessageKey::SignupValidationPasswordMinLength => {
                "signup_validation_password_min_length"
            }
            MessageKey::SignupValidationPasswordMaxLength => {
                "signup_validation_password_max_length"
            }
            MessageKey::SignupValidationEmailRequired => "signup_validation_email_required",
            MessageKey::SignupValidationEmailInvalid => "signup_validation_email_invalid",
            MessageKey::SignupErrorMissingFields => "signup_error_missing_fields",
            MessageKey::SignupErrorAlreadyRegistered => "signup_error_already_registered",
            MessageKey::SignupSuccessMessage => "signup_success_message",
            MessageKey::DashboardValidationEmailRequired => "dashboard_validation_email_required",
            MessageKey::DashboardValidationEmailInvalid => "dashboard_validation_email_invalid",
            MessageKey::DashboardErrorMissingEmail => "dashboard_error_missing_email",
            MessageKey::DashboardErrorNoUserDataShort => "dashboard_error_no_user_data_short",
            MessageKey::DashboardErrorNoUserData => "dashboard_error_no_user_data",
            MessageKey::DashboardErrorUnknown => "dashboard_error_unknown",
            MessageKey::DashboardErrorEmailUpdateFailedPrefix => {
                "dashboard_error_email_update_failed_prefix"
            }
            MessageKey::DashboardErrorEmailUnexpected => "dashboard_error_email_unexpected",
            MessageKey::DashboardErrorTryAgain => "dashboard_error_try_again",
            MessageKey::DashboardSuccessEmailUpdated => "dashboard_success_email_updated",
            MessageKey::DashboardErrorDeleteFailed => "dashboard_error_delete_failed",
            MessageKey::NotificationErrorUserNotFound => "notification_error_user_not_found",
            MessageKey::ErrorNotAuthenticated => "error_not_authenticated",
            MessageKey::ErrorReservationVerificationFailed => {
                "error_reservation_verification_failed"
            }
            MessageKey::ErrorReservationNotAllowed => "error_reservation_not_allowed",
            MessageKey::ErrorReservationFailed => "error_reservation_failed",
            MessageKey::ErrorBookNotFound => "error_book_not_found",
            MessageKey::ErrorMissingRequiredFields => "error_missing_required_fields",
            MessageKey::ErrorInvalidImageUrl => "error_invalid_image_url",
            MessageKey::ErrorInvalidRequestBody => "error_invalid_request_body",
            MessageKey::ErrorInvalidReservationId => "error_invalid_reservation_id",
            MessageKey::ErrorUnknown => "error_unknown",
            MessageKey::ErrorGeneric => "error_generic",
        }
    }

    /// 組み込みの英語メッセージ
    pub fn english(&self) -> &'static str {
        match self {
            MessageKey::ValidationPasswordMinLength => "Password must be at least 6 characters",
            MessageKey::ValidationPasswordMaxLength => "Password must be at most 100 characters",
            MessageKey::ValidationEmailRequired => "Email is required",
            MessageKey::ValidationEmailInvalid => "Please enter a valid email address",
            MessageKey::SigninErrorPrefix => "Sign in failed",
            MessageKey::SigninSuccessMessage => "Sign in successful",
            MessageKey::SignupValidationFirstNameRequired => "First name is required",
            MessageKey::SignupValidationFirstNameMaxLength => {
                "First name must be at most 50 characters"
            }
            MessageKey::SignupValidationLastNameRequired => "Last name is required",
            MessageKey::SignupValidationLastNameMaxLength => {
                "Last name must be at most 50 characters"
            }
            MessageKey::SignupValidationPasswordMinLength => {
                "Password must be at least 8 characters"
            }
            MessageKey::SignupValidationPasswordMaxLength => {
                "Password must be at most 100 characters"
            }
            MessageKey::SignupValidationEmailRequired => "Email is required",
            MessageKey::SignupValidationEmailInvalid => "Please enter a valid email address",
            MessageKey::SignupErrorMissingFields => "Missing fields. Failed to submit the form.",
            MessageKey::SignupErrorAlreadyRegistered => "User already registered",
            MessageKey::SignupSuccessMessage => "Registration successful",
            MessageKey::DashboardValidationEmailRequired => "Email is required",
            MessageKey::DashboardValidationEmailInvalid => "Invalid email address",
            MessageKey::DashboardErrorMissingEmail => "Please provide a valid email address.",
            MessageKey::DashboardErrorNoUserDataShort => "Could not load user data:",
            MessageKey::DashboardErrorNoUserData => "No user data was returned.",
            MessageKey::DashboardErrorUnknown => "unknown error",
            MessageKey::DashboardErrorEmailUpdateFailedPrefix => "Email update failed:",
            MessageKey::DashboardErrorEmailUnexpected => "Unexpected error while updating email:",
            MessageKey::DashboardErrorTryAgain => ". Please try again.",
            MessageKey::DashboardSuccessEmailUpdated => "Email update successful",
            MessageKey::DashboardErrorDeleteFailed => "Failed to delete account",
            MessageKey::NotificationErrorUserNotFound => "User not found",
            MessageKey::ErrorNotAuthenticated => "User not authenticated",
            MessageKey::ErrorReservationVerificationFailed => {
                "Failed to verify reservation eligibility"
            }
            MessageKey::ErrorReservationNotAllowed => {
                "You cannot make reservations at this time"
            }
            MessageKey::ErrorReservationFailed => "Reservation failed",
            MessageKey::ErrorBookNotFound => "Book not found",
            MessageKey::ErrorMissingRequiredFields => "Missing required fields.",
            MessageKey::ErrorInvalidImageUrl => "Image must be a valid URL.",
            MessageKey::ErrorInvalidRequestBody => "The request could not be read.",
            MessageKey::ErrorInvalidReservationId => "Invalid reservation ID",
            MessageKey::ErrorUnknown => "Unknown error",
            MessageKey::ErrorGeneric => "An unexpected error occurred:",
        }
    }
}

/// 検証エラーが発生したフォーム
///
/// 同じ検証エラーでもフォームごとに別のキー群を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    SignIn,
    SignUp,
    UpdateEmail,
}

impl FormKind {
    /// 検証エラーに対応する翻訳キー
    pub fn issue_key(&self, field: Field, issue: ValidationIssue) -> MessageKey {
        use MessageKey as K;
        use ValidationIssue as I;

        match (self, field, issue) {
            (FormKind::SignIn, Field::Password, I::TooShort { .. }) => {
                K::ValidationPasswordMinLength
            }
            (FormKind::SignIn, Field::Password, I::TooLong { .. }) => {
                K::ValidationPasswordMaxLength
            }
            (FormKind::SignIn, Field::Email, I::Required) => K::ValidationEmailRequired,
            (FormKind::SignIn, Field::Email, I::InvalidEmail) => K::ValidationEmailInvalid,

            (FormKind::SignUp, Field::FirstName, I::TooLong { .. }) => {
                K::SignupValidationFirstNameMaxLength
            }
            (FormKind::SignUp, Field::FirstName, _) => K::SignupValidationFirstNameRequired,
            (FormKind::SignUp, Field::LastName, I::TooLong { .. }) => {
                K::SignupValidationLastNameMaxLength
            }
            (FormKind::SignUp, Field::LastName, _) => K::SignupValidationLastNameRequired,
            (FormKind::SignUp, Field::Password, I::TooLong { .. }) => {
                K::SignupValidationPasswordMaxLength
            }
            (FormKind::SignUp, Field::Password, _) => K::SignupValidationPasswordMinLength,
            (FormKind::SignUp, Field::Email, I::Required) => K::SignupValidationEmailRequired,
            (FormKind::SignUp, Field::Email, _) => K::SignupValidationEmailInvalid,

            (FormKind::UpdateEmail, Field::Email, I::Required) => {
                K::DashboardValidationEmailRequired
            }
            (FormKind::UpdateEmail, Field::Email, _) => K::DashboardValidationEmailInvalid,

            _ => K::ErrorUnknown,
        }
    }

    /// 検証失敗時のフォーム全体のメッセージ
    pub fn summary_key(&self) -> MessageKey {
        match self {
            FormKind::SignIn | FormKind::SignUp => MessageKey::SignupErrorMissingFields,
            FormKind::UpdateEmail => MessageKey::DashboardErrorMissingEmail,
        }
    }
}

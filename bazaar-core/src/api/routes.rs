macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and its clients
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod auth {
        pub const REGISTER: &str = v1_path!("/auth/register");
        pub const AUTHENTICATE: &str = v1_path!("/auth/authenticate");
        pub const CONFIRM_EMAIL: &str = v1_path!("/auth/confirm-email");
        pub const REQUEST_PASSWORD_RESET: &str =
            v1_path!("/auth/request-password-reset");
        pub const CONFIRM_PASSWORD_RESET: &str =
            v1_path!("/auth/confirm-password-reset");
        pub const REFRESH_TOKEN: &str = v1_path!("/auth/refresh-token");
    }

    pub mod policy {
        pub const CUSTOMER: &str = v1_path!("/policy/customer");
        pub const VENDOR: &str = v1_path!("/policy/vendor");
        pub const ADMIN: &str = v1_path!("/policy/admin");
    }

    pub mod users {
        pub const BY_EMAIL: &str = v1_path!("/users/{email}");
    }

    pub mod customers {
        pub const BY_EMAIL: &str = v1_path!("/customers/{email}");
    }

    pub mod vendors {
        pub const BY_EMAIL: &str = v1_path!("/vendors/{email}");
    }
}

pub mod utils {
    /// Replace a single path parameter (e.g. `"{email}"`) with the provided
    /// value, percent-encoding it so addresses survive as one path segment.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, &urlencoding::encode(value.as_ref()))
    }
}

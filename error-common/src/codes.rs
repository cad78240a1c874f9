// Standardized error codes, logged with every reported error

pub mod validation {
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
    pub const WEAK_PASSWORD: &str = "VALIDATION_1004";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const TOKEN_EXPIRED: &str = "AUTH_2002";
    pub const TOKEN_INVALID: &str = "AUTH_2003";
    pub const TOKEN_MISSING: &str = "AUTH_2004";
    pub const CLAIM_MISSING: &str = "AUTH_2005";
    pub const CLAIM_WRONG_TYPE: &str = "AUTH_2006";
    pub const MAGIC_LOGIN_NOT_ENABLED: &str = "AUTH_2007";
    pub const MAGIC_LOGIN_MISMATCH: &str = "AUTH_2008";
    pub const PRINCIPAL_NOT_FOUND: &str = "AUTH_2009";
}

pub mod authorization {
    pub const ADMIN_REQUIRED: &str = "AUTHZ_3002";
}

pub mod conflict {
    pub const DUPLICATE_IDENTITY: &str = "CONFLICT_4001";
}

pub mod internal {
    pub const STORE_FAILURE: &str = "INTERNAL_5001";
    pub const HASHING_FAILED: &str = "INTERNAL_5002";
    pub const SIGNING_FAILED: &str = "INTERNAL_5003";
    pub const CONFIGURATION: &str = "INTERNAL_5004";
    pub const CONTEXT_MISSING: &str = "INTERNAL_5005";
}

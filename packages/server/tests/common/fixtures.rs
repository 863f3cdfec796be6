//! Seeded accounts shared by the integration suites.

use elverra_core::kernel::MockAuthBackend;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse";

/// Plain member with an email credential
pub const MEMBER_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0001);
pub const MEMBER_EMAIL: &str = "member@elverra.test";

/// Member who registered with a phone credential
pub const PHONE_MEMBER_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0002);
pub const PHONE_MEMBER_PHONE: &str = "+22376000001";

/// Older account: email credential, phone only recorded in the profiles table
pub const LEGACY_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0003);
pub const LEGACY_EMAIL: &str = "legacy@elverra.test";
pub const LEGACY_LOCAL_PHONE: &str = "76000002";

pub const SUPPORT_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0004);
pub const SUPPORT_EMAIL: &str = "support@elverra.test";

pub const SUPERADMIN_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0005);
pub const SUPERADMIN_EMAIL: &str = "root@elverra.test";

/// Backend knowing every account above
pub fn seeded_backend() -> MockAuthBackend {
    MockAuthBackend::new()
        .with_account(MEMBER_ID, Some(MEMBER_EMAIL), None, PASSWORD)
        .with_role(MEMBER_ID, "user")
        .with_account(PHONE_MEMBER_ID, None, Some(PHONE_MEMBER_PHONE), PASSWORD)
        .with_account(LEGACY_ID, Some(LEGACY_EMAIL), None, PASSWORD)
        .with_row("profiles", "phone", "email", "22376000002", LEGACY_EMAIL)
        .with_account(SUPPORT_ID, Some(SUPPORT_EMAIL), None, PASSWORD)
        .with_role(SUPPORT_ID, "support")
        .with_account(SUPERADMIN_ID, Some(SUPERADMIN_EMAIL), None, PASSWORD)
        .with_role(SUPERADMIN_ID, "SUPERADMIN")
}

/// Access token the seeded backend would have issued
pub fn token_for(user_id: Uuid, email: &str) -> String {
    MockAuthBackend::access_token_for(user_id, Some(email))
}

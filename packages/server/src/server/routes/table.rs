//! Declarative path → page table
//!
//! The page router is generated from `ROUTES`; gated entries get the role
//! gate layer in front of their handler.

use crate::domains::auth::DEFAULT_ADMIN_ROLES;

/// Back-office pages
pub const ADMIN_ROLES: &[&str] = DEFAULT_ADMIN_ROLES;
pub const SUPERADMIN_ROLES: &[&str] = &["SUPERADMIN"];

/// Who may open a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed-in users whose role is in the list
    Roles(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    Contact,
    Login,
    Register,
    Jobs,
    JobDetail,
    Discounts,
    Shop,
    Events,
    Services,
    AffiliateProgram,
    PaymentSuccess,
    PaymentFailed,
    PaymentPending,
    PaymentCancelled,
    Dashboard,
    Profile,
    AffiliateDashboard,
    Payments,
    Loans,
    AdminDashboard,
    AdminUsers,
    AdminPayments,
    AdminCms,
    SuperadminDashboard,
    SuperadminRoles,
    NotFound,
    ServerError,
}

impl Page {
    /// Catalog prefix of the page; also the id the client bundle mounts
    pub fn key(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Contact => "contact",
            Page::Login => "login",
            Page::Register => "register",
            Page::Jobs => "jobs",
            Page::JobDetail => "job_detail",
            Page::Discounts => "discounts",
            Page::Shop => "shop",
            Page::Events => "events",
            Page::Services => "services",
            Page::AffiliateProgram => "affiliate_program",
            Page::PaymentSuccess => "payment.success",
            Page::PaymentFailed => "payment.failed",
            Page::PaymentPending => "payment.pending",
            Page::PaymentCancelled => "payment.cancelled",
            Page::Dashboard => "dashboard",
            Page::Profile => "dashboard.profile",
            Page::AffiliateDashboard => "dashboard.affiliate",
            Page::Payments => "dashboard.payments",
            Page::Loans => "dashboard.loans",
            Page::AdminDashboard => "admin.dashboard",
            Page::AdminUsers => "admin.users",
            Page::AdminPayments => "admin.payments",
            Page::AdminCms => "admin.cms",
            Page::SuperadminDashboard => "superadmin.dashboard",
            Page::SuperadminRoles => "superadmin.roles",
            Page::NotFound => "not_found",
            Page::ServerError => "server_error",
        }
    }

    pub fn title_key(&self) -> String {
        format!("{}.title", self.key())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RouteDef {
    pub path: &'static str,
    pub page: Page,
    pub access: Access,
}

const fn route(path: &'static str, page: Page, access: Access) -> RouteDef {
    RouteDef { path, page, access }
}

pub const ROUTES: &[RouteDef] = &[
    // Public
    route("/", Page::Home, Access::Public),
    route("/about", Page::About, Access::Public),
    route("/contact", Page::Contact, Access::Public),
    route("/login", Page::Login, Access::Public),
    route("/register", Page::Register, Access::Public),
    route("/jobs", Page::Jobs, Access::Public),
    route("/jobs/:id", Page::JobDetail, Access::Public),
    route("/discounts", Page::Discounts, Access::Public),
    route("/shop", Page::Shop, Access::Public),
    route("/events", Page::Events, Access::Public),
    route("/services", Page::Services, Access::Public),
    route("/affiliate-program", Page::AffiliateProgram, Access::Public),
    route("/payment/success", Page::PaymentSuccess, Access::Public),
    route("/payment/failed", Page::PaymentFailed, Access::Public),
    route("/payment/pending", Page::PaymentPending, Access::Public),
    route("/payment/cancelled", Page::PaymentCancelled, Access::Public),
    // Members
    route("/dashboard", Page::Dashboard, Access::Authenticated),
    route("/dashboard/profile", Page::Profile, Access::Authenticated),
    route("/dashboard/affiliate", Page::AffiliateDashboard, Access::Authenticated),
    route("/dashboard/payments", Page::Payments, Access::Authenticated),
    route("/dashboard/loans", Page::Loans, Access::Authenticated),
    // Back-office
    route("/admin", Page::AdminDashboard, Access::Roles(ADMIN_ROLES)),
    route("/admin/users", Page::AdminUsers, Access::Roles(ADMIN_ROLES)),
    route("/admin/payments", Page::AdminPayments, Access::Roles(ADMIN_ROLES)),
    route("/admin/cms", Page::AdminCms, Access::Roles(ADMIN_ROLES)),
    route("/superadmin", Page::SuperadminDashboard, Access::Roles(SUPERADMIN_ROLES)),
    route("/superadmin/roles", Page::SuperadminRoles, Access::Roles(SUPERADMIN_ROLES)),
];

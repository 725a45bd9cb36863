//! Application routes.

use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    /// Collection view with the relax-mode toggle.
    #[at("/")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

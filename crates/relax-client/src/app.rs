//! Main application component.

use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::{HomePage, NotFoundPage};
use crate::routes::Route;

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <HomePage /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

//! Home page: the collection grid and the relax-mode toggle.

use yew::prelude::*;
use yew_icons::{Icon, IconData};

use crate::components::RelaxMode;
use crate::hooks::use_items;

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let items = use_items();
    let relaxing = use_state(|| false);

    let on_open = {
        let relaxing = relaxing.clone();
        Callback::from(move |_: MouseEvent| relaxing.set(true))
    };
    let on_close = {
        let relaxing = relaxing.clone();
        Callback::from(move |()| relaxing.set(false))
    };

    if *relaxing {
        return html! {
            <RelaxMode
                items={items.items.clone()}
                loading={items.loading}
                {on_close}
            />
        };
    }

    let grid = if items.loading {
        html! { <p class="collection-status">{ "Loading…" }</p> }
    } else if let Some(error) = &items.error {
        html! { <p class="collection-status error">{ format!("Could not load the collection: {error}") }</p> }
    } else if items.items.is_empty() {
        html! { <p class="collection-status">{ "Your collection is empty." }</p> }
    } else {
        html! {
            <ul class="collection-grid">
                { for items.items.iter().map(|item| html! {
                    <li key={item.id.clone()} class={classes!("collection-item", item.size.to_string())}>
                        <img src={item.image_url.clone()} alt={item.id.clone()} loading="lazy" />
                    </li>
                }) }
            </ul>
        }
    };

    html! {
        <main class="page home-page">
            <header class="home-header">
                <h1>{ "Collection" }</h1>
                <button class="relax-toggle" onclick={on_open}>
                    <Icon data={IconData::LUCIDE_PLAY} width="18px" height="18px" />
                    <span>{ "Relax" }</span>
                </button>
            </header>
            { grid }
        </main>
    }
}

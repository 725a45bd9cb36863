//! Hook for fetching the item collection.

use std::rc::Rc;

use gloo::net::http::Request;
use relax_core::Item;
use yew::prelude::*;

/// Where the collection is served from.
const ITEMS_URL: &str = "/items.json";

#[derive(Clone, PartialEq, Default)]
pub struct ItemsState {
    pub items: Rc<Vec<Item>>,
    pub loading: bool,
    pub error: Option<String>,
}

async fn fetch_items() -> Result<Vec<Item>, String> {
    let response = Request::get(ITEMS_URL)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    response.json::<Vec<Item>>().await.map_err(|e| e.to_string())
}

/// Fetches the collection once on mount.
///
/// A failed fetch leaves the collection empty; relax mode then shows its
/// empty state instead of spawning anything.
#[hook]
pub fn use_items() -> UseStateHandle<ItemsState> {
    let state = use_state(|| ItemsState {
        items: Rc::default(),
        loading: true,
        error: None,
    });

    {
        let state = state.clone();
        use_effect_with((), move |()| {
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_items().await {
                    Ok(items) => {
                        tracing::info!(count = items.len(), "[client] collection loaded");
                        state.set(ItemsState {
                            items: Rc::new(items),
                            loading: false,
                            error: None,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("[client] collection fetch failed: {e}");
                        state.set(ItemsState {
                            items: Rc::default(),
                            loading: false,
                            error: Some(e),
                        });
                    }
                }
            });

            || ()
        });
    }

    state
}

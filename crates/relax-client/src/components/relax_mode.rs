//! Full-screen relax-mode overlay.

use std::rc::Rc;

use relax_core::{Item, SandboxStatus};
use yew::prelude::*;
use yew_icons::{Icon, IconData};

use crate::hooks::use_relax_loop;

#[derive(Properties, PartialEq)]
pub struct RelaxModeProps {
    pub items: Rc<Vec<Item>>,
    /// Still fetching the collection.
    #[prop_or_default]
    pub loading: bool,
    pub on_close: Callback<()>,
}

/// Canvas sandbox where collected items fall, collide and can be thrown.
///
/// Unmounting this component tears the sandbox down.
#[function_component(RelaxMode)]
pub fn relax_mode(props: &RelaxModeProps) -> Html {
    let canvas_ref = use_node_ref();
    let status = use_relax_loop(canvas_ref.clone(), props.items.clone());

    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let hint = match *status {
        SandboxStatus::Ready { .. } => html! {
            <p class="relax-hint">{ "drag to throw • double-click to add more" }</p>
        },
        SandboxStatus::Loading if props.loading => html! {
            <p class="relax-hint">{ "gathering your collection…" }</p>
        },
        SandboxStatus::Loading => html! {
            <p class="relax-hint">{ "nothing collected yet" }</p>
        },
        SandboxStatus::Disposed => html! {},
    };

    html! {
        <div class="relax-mode">
            <canvas ref={canvas_ref} class="relax-canvas" style="touch-action: none;" />
            <button class="relax-close" title="Exit relax mode" onclick={on_close}>
                <Icon data={IconData::LUCIDE_X} width="20px" height="20px" />
            </button>
            { hint }
        </div>
    }
}

use prefsync_core::HelperEntry;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub entries: Vec<HelperEntry>,
    pub on_close: Callback<()>,
}

fn render_keys(keys: &[String]) -> Html {
    keys.iter()
        .enumerate()
        .map(|(i, key)| {
            html! {
                <>
                    if i > 0 { { " + " } }
                    <kbd>{ key.clone() }</kbd>
                </>
            }
        })
        .collect()
}

#[function_component(ShortcutHelper)]
pub fn shortcut_helper(p: &Props) -> Html {
    let close = {
        let cb = p.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div class="keyboard-shortcuts-helper" role="dialog" aria-labelledby="shortcuts-title">
            <div class="shortcuts-header">
                <h6 id="shortcuts-title">{ "Keyboard Shortcuts" }</h6>
                <button type="button" class="btn-close" aria-label="Close" onclick={close}></button>
            </div>
            <ul class="shortcuts-list">
                { for p.entries.iter().map(|entry| html! {
                    <li>{ render_keys(&entry.keys) }{ " - " }{ entry.label.clone() }</li>
                }) }
            </ul>
        </div>
    }
}

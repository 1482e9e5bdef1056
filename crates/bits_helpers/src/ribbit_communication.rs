use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;
use ribbit_bits::{BitDuration, BitMessage, BitParameters, BitResult, RibbitMessage};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

/// Both directions of the conversation with the Ribbit host.
///
/// Cloning shares the underlying queues, so a clone can be handed to a
/// browser callback or a test harness.
#[derive(Resource, Clone, Default)]
pub struct RibbitChannel {
    inbox: Arc<Mutex<Vec<RibbitMessage>>>,
    outbox: Arc<Mutex<Vec<BitMessage>>>,
}

impl RibbitChannel {
    /// Queues a message as if the host had sent it.
    pub fn receive(&self, message: RibbitMessage) {
        self.inbox.lock().push(message);
    }

    pub fn take_received(&self) -> Vec<RibbitMessage> {
        self.inbox.lock().drain(..).collect()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn send(&self, message: BitMessage) {
        info!("Bit message: {message:?}");
        self.outbox.lock().push(message);
    }

    #[cfg(target_arch = "wasm32")]
    pub fn send(&self, message: BitMessage) {
        let Some(window) = web_sys::window() else {
            error!("{message:?} not sent, no global window.");
            return;
        };
        let Ok(message_str) = serde_wasm_bindgen::to_value(&message) else {
            error!("Could not serialize {message:?}");
            return;
        };
        let Ok(Some(parent_window)) = window.parent() else {
            error!("{message:?} not sent, parent_window not found.");
            return;
        };
        if let Err(err) = parent_window.post_message(&message_str, "*") {
            error!("Could not post message {message_str:?}. {err:?}");
        }
    }

    /// Messages sent to the host. Always empty on wasm, where they are
    /// posted straight to the parent window.
    pub fn take_sent(&self) -> Vec<BitMessage> {
        self.outbox.lock().drain(..).collect()
    }
}

#[cfg(target_arch = "wasm32")]
fn listen_ribbit_messages(channel: Res<RibbitChannel>) {
    let Some(window) = web_sys::window() else {
        error!("No global window, Ribbit messages will be ignored");
        return;
    };

    let channel = channel.clone();
    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        let message: Result<RibbitMessage, serde_wasm_bindgen::Error> =
            serde_wasm_bindgen::from_value(event.data());

        let Ok(message) = message else {
            error!("Could not parse ribbit message {:?}", &event.data());
            return;
        };

        channel.receive(message);
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Err(err) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to add message event listener: {err:?}");
        return;
    }

    // The listener lives as long as the page.
    closure.forget();
}

/// Answers the messages the Ribbit host can send to a bit.
///
/// These are called by the platform through [`RibbitCommunicationPlugin`],
/// never by the bit itself.
pub trait RibbitMessageHandler: Send + Sync + Default + 'static {
    fn duration(world: &mut World) -> BitDuration;
    fn end(world: &mut World) -> BitResult;
    fn restart(world: &mut World);
}

fn process_ribbit_messages<T: RibbitMessageHandler>(world: &mut World) {
    let channel = world.resource::<RibbitChannel>().clone();

    for message in channel.take_received() {
        match message {
            RibbitMessage::End => {
                let result = T::end(world);
                channel.send(BitMessage::End(result));
            }
            RibbitMessage::Parameters => {
                let duration = T::duration(world);
                channel.send(BitMessage::Parameters(BitParameters { duration }));
            }
            RibbitMessage::Restart => T::restart(world),
            RibbitMessage::Start => {
                // The bit starts on its own once loaded.
            }
        }
    }
}

fn ready(channel: Res<RibbitChannel>) {
    channel.send(BitMessage::Ready);
}

#[derive(Default)]
pub struct RibbitCommunicationPlugin<T: RibbitMessageHandler>(core::marker::PhantomData<T>);

impl<T: RibbitMessageHandler> Plugin for RibbitCommunicationPlugin<T> {
    fn build(&self, app: &mut App) {
        app.init_resource::<RibbitChannel>();
        app.add_systems(PostUpdate, process_ribbit_messages::<T>);
        #[cfg(target_arch = "wasm32")]
        {
            app.add_systems(Startup, listen_ribbit_messages);
        }
        app.add_systems(PostStartup, ready);
    }
}

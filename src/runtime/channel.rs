use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    Result, ShareLock,
    events::{DesignerEvent, Message},
    graph::NodeId,
    runtime::OperationId,
    viewport::Viewport,
};

pub type DesignerEventHandle = Arc<dyn Fn(&Message) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// use the glob pattern to match the node id
    /// eg. info-node*
    pub nid: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            nid: "*".to_string(),
        }
    }
}

impl ChannelOptions {
    pub fn with_nid(nid: impl Into<String>) -> Self {
        Self {
            nid: nid.into(),
        }
    }
}

/// Synchronous fan-out of designer events to registered handlers.
#[derive(Clone, Default)]
pub struct Channel {
    events: ShareLock<Vec<DesignerEventHandle>>,
}

impl Channel {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub(crate) fn emit(
        &self,
        event: DesignerEvent,
    ) {
        let message = Message::new(event);
        // handlers may subscribe while being dispatched
        let handlers = self.events.read().unwrap_or_else(PoisonError::into_inner).clone();
        for handle in handlers.iter() {
            (handle)(&message);
        }
    }

    fn subscribe(
        &self,
        handle: DesignerEventHandle,
    ) {
        self.events.write().unwrap_or_else(PoisonError::into_inner).push(handle);
    }

    pub fn handler_count(&self) -> usize {
        self.events.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[derive(Clone)]
pub struct ChannelEvent {
    channel: Arc<Channel>,

    glob: globset::GlobMatcher,
    match_all: bool,
}

impl ChannelEvent {
    pub fn channel(
        channel: Arc<Channel>,
        options: ChannelOptions,
    ) -> Result<Self> {
        Ok(Self {
            channel,
            glob: globset::Glob::new(&options.nid)?.compile_matcher(),
            match_all: options.nid == "*",
        })
    }

    pub fn on_event(
        &self,
        f: impl Fn(&Message) + Send + Sync + 'static,
    ) {
        let filter = self.filter();

        self.channel.subscribe(Arc::new(move |m| {
            if filter.is_match(&m.event) {
                f(m);
            }
        }));
    }

    pub fn on_node_added(
        &self,
        f: impl Fn(NodeId) + Send + Sync + 'static,
    ) {
        let filter = self.filter();

        self.channel.subscribe(Arc::new(move |m| {
            if let DesignerEvent::NodeAdded { node, .. } = &m.event {
                if filter.is_match(&m.event) {
                    f(node.clone());
                }
            }
        }));
    }

    pub fn on_selection_changed(
        &self,
        f: impl Fn(Option<NodeId>) + Send + Sync + 'static,
    ) {
        let filter = self.filter();

        self.channel.subscribe(Arc::new(move |m| {
            if let DesignerEvent::SelectionChanged(node) = &m.event {
                if filter.is_match(&m.event) {
                    f(node.clone());
                }
            }
        }));
    }

    pub fn on_viewport_changed(
        &self,
        f: impl Fn(Viewport) + Send + Sync + 'static,
    ) {
        let filter = self.filter();

        self.channel.subscribe(Arc::new(move |m| {
            if let DesignerEvent::ViewportChanged(viewport) = &m.event {
                if filter.is_match(&m.event) {
                    f(*viewport);
                }
            }
        }));
    }

    pub fn on_operation_completed(
        &self,
        f: impl Fn(OperationId, NodeId) + Send + Sync + 'static,
    ) {
        let filter = self.filter();

        self.channel.subscribe(Arc::new(move |m| {
            if let DesignerEvent::OperationCompleted { operation, node } = &m.event {
                if filter.is_match(&m.event) {
                    f(*operation, node.clone());
                }
            }
        }));
    }

    fn filter(&self) -> NodeFilter {
        NodeFilter {
            glob: self.glob.clone(),
            match_all: self.match_all,
        }
    }
}

/// Events without a node only reach `*` subscribers.
struct NodeFilter {
    glob: globset::GlobMatcher,
    match_all: bool,
}

impl NodeFilter {
    fn is_match(
        &self,
        event: &DesignerEvent,
    ) -> bool {
        match event.node_id() {
            Some(nid) => self.glob.is_match(nid),
            None => self.match_all,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_glob_filters_by_node_id() {
        let channel = Arc::new(Channel::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_nid("info-node*")).unwrap().on_node_added(move |nid| {
            sink.lock().unwrap().push(nid);
        });

        channel.emit(DesignerEvent::NodeAdded {
            node: "approval-root-0".into(),
            kind: "approval".into(),
        });
        channel.emit(DesignerEvent::NodeAdded {
            node: "info-node-root-1".into(),
            kind: "info".into(),
        });

        assert_eq!(*seen.lock().unwrap(), vec!["info-node-root-1".to_string()]);
    }

    #[test]
    fn test_nodeless_events_reach_wildcard_only() {
        let channel = Arc::new(Channel::new());
        let all = Arc::new(Mutex::new(0));
        let filtered = Arc::new(Mutex::new(0));

        let sink = all.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::default()).unwrap().on_event(move |_| {
            *sink.lock().unwrap() += 1;
        });
        let sink = filtered.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_nid("approval*")).unwrap().on_event(move |_| {
            *sink.lock().unwrap() += 1;
        });

        channel.emit(DesignerEvent::ViewportChanged(Viewport::default()));
        channel.emit(DesignerEvent::OperationCancelled(3));

        assert_eq!(*all.lock().unwrap(), 2);
        assert_eq!(*filtered.lock().unwrap(), 0);
        assert_eq!(channel.handler_count(), 2);
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let channel = Arc::new(Channel::new());
        assert!(ChannelEvent::channel(channel, ChannelOptions::with_nid("info-node[")).is_err());
    }

    #[test]
    fn test_handler_can_subscribe_during_dispatch() {
        let channel = Arc::new(Channel::new());
        let inner = channel.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::default()).unwrap().on_event(move |_| {
            ChannelEvent::channel(inner.clone(), ChannelOptions::default()).unwrap().on_event(|_| {});
        });

        channel.emit(DesignerEvent::SelectionChanged(None));
        assert_eq!(channel.handler_count(), 2);
    }
}

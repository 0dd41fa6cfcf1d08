use slotmap::new_key_type;

new_key_type! {
    /// Identifies a pipe node (one placed segment).
    pub struct NodeId;

    /// Identifies a network of joined nodes.
    pub struct NetworkId;
}

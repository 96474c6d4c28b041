//! `Factory<P>` — a named template pairing a schema set with a constructor.
//!
//! Reading a factory from text or bytes decodes a `SchemaInstance` and binds
//! it into a [`FactoryInstance`], which is both *code* (call
//! [`produce`][FactoryInstance::produce] for a fresh product) and *data*
//! (re-serializable by pairing the captured instance with the owning
//! factory's id).  That duality is what lets a condition or action tree be
//! stored, re-emitted, and evaluated uniformly.

use std::sync::Arc;

use bhv_schema::{DecodeResult, Node, SchemaInstance, SchemaSet, WireReader, WireWriter};

type Ctor<P> = Arc<dyn Fn(&SchemaInstance) -> P + Send + Sync>;

/// A globally-unique id, a schema set, and a constructor closure.
pub struct Factory<P> {
    id:     Arc<str>,
    schema: Arc<SchemaSet>,
    ctor:   Ctor<P>,
}

impl<P> Clone for Factory<P> {
    fn clone(&self) -> Self {
        Self {
            id:     self.id.clone(),
            schema: self.schema.clone(),
            ctor:   self.ctor.clone(),
        }
    }
}

impl<P: 'static> Factory<P> {
    pub fn new(
        id: impl Into<Arc<str>>,
        schema: SchemaSet,
        ctor: impl Fn(&SchemaInstance) -> P + Send + Sync + 'static,
    ) -> Self {
        Self {
            id:     id.into(),
            schema: Arc::new(schema),
            ctor:   Arc::new(ctor),
        }
    }

    /// A factory with an empty schema whose products are clones of `product`.
    ///
    /// Used for safe fallbacks (constant-true condition, no-op action) when
    /// a referenced factory id is unknown.
    pub fn constant(id: impl Into<Arc<str>>, product: P) -> Self
    where
        P: Clone + Send + Sync,
    {
        Self::new(id, SchemaSet::new(), move |_| product.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &Arc<SchemaSet> {
        &self.schema
    }

    /// Bind an already-decoded instance.
    pub fn bind(&self, instance: SchemaInstance) -> FactoryInstance<P> {
        FactoryInstance { factory: self.clone(), instance }
    }

    /// Decode a bound instance from a text object.
    ///
    /// The object's `"type"` key (if present) is ignored here — it addressed
    /// this factory and is not a schema field.
    pub fn read_text(&self, node: &Node) -> DecodeResult<FactoryInstance<P>> {
        Ok(self.bind(self.schema.decode_text(node)?))
    }

    /// Decode a bound instance from a wire stream positioned after the
    /// factory id.
    pub fn read_bytes(&self, reader: &mut WireReader<'_>) -> DecodeResult<FactoryInstance<P>> {
        Ok(self.bind(self.schema.decode_bytes(reader)?))
    }

    /// Bind an instance holding every field's declared default.
    ///
    /// Fails if any field has no default — such a factory cannot be
    /// default-instantiated.
    pub fn with_defaults(&self) -> DecodeResult<FactoryInstance<P>> {
        Ok(self.bind(self.schema.instantiate_with_defaults()?))
    }
}

// ── FactoryInstance ───────────────────────────────────────────────────────────

/// A factory bound to decoded field values.
pub struct FactoryInstance<P> {
    factory:  Factory<P>,
    instance: SchemaInstance,
}

impl<P> std::fmt::Debug for FactoryInstance<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryInstance")
            .field("factory", &self.factory.id)
            .finish_non_exhaustive()
    }
}

impl<P> Clone for FactoryInstance<P> {
    fn clone(&self) -> Self {
        Self {
            factory:  self.factory.clone(),
            instance: self.instance.clone(),
        }
    }
}

impl<P: 'static> FactoryInstance<P> {
    /// Invoke the constructor, producing a fresh product from the bound
    /// values.  May be called repeatedly.
    pub fn produce(&self) -> P {
        (self.factory.ctor)(&self.instance)
    }

    pub fn factory(&self) -> &Factory<P> {
        &self.factory
    }

    pub fn factory_id(&self) -> &str {
        self.factory.id()
    }

    pub fn instance(&self) -> &SchemaInstance {
        &self.instance
    }

    /// Re-emit as a text object: the bound fields plus a `"type"` key
    /// carrying the factory id.
    pub fn to_json(&self) -> DecodeResult<Node> {
        let mut node = self.instance.to_text()?;
        if let Node::Object(obj) = &mut node {
            obj.insert("type".to_owned(), Node::String(self.factory.id().to_owned()));
        }
        Ok(node)
    }

    /// Re-emit as wire bytes: i32 length-prefixed factory id, then the
    /// fields in declared order.
    pub fn write_bytes(&self, writer: &mut WireWriter) -> DecodeResult<()> {
        writer.put_str(self.factory.id());
        self.instance.write_bytes(writer)
    }
}

use fxhash::FxHashSet;
use log::debug;

use crate::backend::assert_bindings;
use crate::{gpu, Backend, Kernel, TextureDesc};

/// Virtual texture recorded by [`GraphBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphTexture(u32);

impl GraphTexture {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct GraphResource {
    pub desc: TextureDesc,

    /// Whether the texture is owned by the host (camera color, depth etc.)
    pub imported: bool,

    pub released: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphOp {
    Copy,
    Kernel(Kernel),
}

/// Pass recorded by [`GraphBackend`], with everything a render graph needs
/// to schedule it.
#[derive(Clone, Debug)]
pub struct GraphNode {
    pub op: GraphOp,

    /// Sources in the kernel's order; `None` marks an optional source the
    /// host has to substitute
    pub reads: Vec<Option<GraphTexture>>,

    pub writes: Vec<GraphTexture>,
    pub params: Option<gpu::PassParams>,
}

impl GraphNode {
    pub fn kernel(&self) -> Option<Kernel> {
        match self.op {
            GraphOp::Kernel(kernel) => Some(kernel),
            GraphOp::Copy => None,
        }
    }
}

/// Backend that doesn't touch the GPU, but records passes and their
/// resource dependencies instead, for the host's render graph to schedule
/// (and for tests to inspect).
#[derive(Debug, Default)]
pub struct GraphBackend {
    resources: Vec<GraphResource>,
    nodes: Vec<GraphNode>,
    missing_kernels: FxHashSet<Kernel>,
}

impl GraphBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretends that given kernel isn't provided, e.g. because the host's
    /// shader is outdated.
    pub fn without_kernel(mut self, kernel: Kernel) -> Self {
        self.missing_kernels.insert(kernel);
        self
    }

    /// Registers a texture owned by the host.
    pub fn import(&mut self, desc: TextureDesc) -> GraphTexture {
        self.push(desc, true)
    }

    pub fn resource(&self, texture: GraphTexture) -> &GraphResource {
        &self.resources[texture.0 as usize]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Takes the nodes recorded so far, leaving the backend ready for the
    /// next frame.
    pub fn take_nodes(&mut self) -> Vec<GraphNode> {
        std::mem::take(&mut self.nodes)
    }

    pub fn kernels(&self) -> Vec<Kernel> {
        self.nodes.iter().filter_map(GraphNode::kernel).collect()
    }

    /// Returns the number of textures created by the engine.
    pub fn created_textures(&self) -> usize {
        self.resources.iter().filter(|res| !res.imported).count()
    }

    pub fn released_textures(&self) -> usize {
        self.resources.iter().filter(|res| res.released).count()
    }

    pub fn live_textures(&self) -> usize {
        self.created_textures() - self.released_textures()
    }

    fn push(&mut self, desc: TextureDesc, imported: bool) -> GraphTexture {
        let texture = GraphTexture(self.resources.len() as u32);

        self.resources.push(GraphResource {
            desc,
            imported,
            released: false,
        });

        texture
    }

    fn assert_live(&self, texture: GraphTexture) {
        let res = self.resource(texture);

        assert!(
            !res.released,
            "texture `{}` (#{}) used after being released",
            res.desc.label, texture.0
        );
    }
}

impl Backend for GraphBackend {
    type Texture = GraphTexture;

    fn supports(&self, kernel: Kernel) -> bool {
        !self.missing_kernels.contains(&kernel)
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> GraphTexture {
        let texture = self.push(desc.clone(), false);

        debug!(
            "Recorded texture `{}` (#{}); size={}x{}, format={:?}",
            desc.label, texture.0, desc.size.x, desc.size.y, desc.format
        );

        texture
    }

    fn release_texture(&mut self, texture: GraphTexture) {
        self.assert_live(texture);

        let res = &mut self.resources[texture.0 as usize];

        assert!(!res.imported, "texture `{}` is imported", res.desc.label);

        res.released = true;
    }

    fn copy_texture(&mut self, src: &GraphTexture, dst: &GraphTexture) {
        self.assert_live(*src);
        self.assert_live(*dst);

        let src_desc = &self.resource(*src).desc;
        let dst_desc = &self.resource(*dst).desc;

        assert_eq!(
            (src_desc.size, src_desc.format),
            (dst_desc.size, dst_desc.format),
            "cannot copy `{}` into `{}`",
            src_desc.label,
            dst_desc.label
        );

        self.nodes.push(GraphNode {
            op: GraphOp::Copy,
            reads: vec![Some(*src)],
            writes: vec![*dst],
            params: None,
        });
    }

    fn run_kernel(
        &mut self,
        kernel: Kernel,
        sources: &[Option<&GraphTexture>],
        targets: &[&GraphTexture],
        params: &gpu::PassParams,
    ) {
        assert!(self.supports(kernel), "kernel `{kernel}` is not available");
        assert_bindings(kernel, sources, targets);

        for texture in sources.iter().flatten().chain(targets) {
            self.assert_live(**texture);
        }

        self.nodes.push(GraphNode {
            op: GraphOp::Kernel(kernel),
            reads: sources.iter().map(|src| src.copied()).collect(),
            writes: targets.iter().map(|dst| **dst).collect(),
            params: Some(*params),
        });
    }
}

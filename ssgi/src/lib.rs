//! Screen-space global illumination: one bounce of indirect diffuse lighting
//! traced through the depth and color buffers of the current frame, then
//! accumulated over time, denoised and composited back into the camera's
//! color target.
//!
//! GPU kernels are supplied by the host; this crate orchestrates them and
//! owns every resource that has to survive between frames.

mod accumulation;
mod activation;
mod backend;
mod backends;
mod camera;
mod error;
mod frame_config;
mod frame_counter;
mod frame_textures;
mod gbuffer;
mod history;
mod host;
mod probes;
mod quality;
mod ray_steps;
mod settings;
mod utils;

use log::{debug, error, info, warn};
pub use ssgi_gpu as gpu;

pub use self::accumulation::*;
pub use self::activation::*;
pub use self::backend::*;
pub use self::backends::*;
pub use self::camera::*;
pub use self::error::*;
pub use self::frame_config::*;
pub use self::frame_counter::*;
pub use self::frame_textures::*;
pub use self::gbuffer::*;
pub use self::history::*;
pub use self::host::*;
pub use self::probes::*;
pub use self::quality::*;
pub use self::ray_steps::*;
pub use self::settings::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineState {
    Pending,
    Ready,
    Disabled,
}

/// SSGI orchestrator; `T` is the texture type of the backend it renders
/// with.
#[derive(Debug)]
pub struct Engine<T> {
    features: FeatureSettings,
    state: EngineState,
    setup_notice: LogOnce,
    activation: Activation,
    quality: QualityPresetResolver,
    frame_counter: FrameCounter,
    history: HistoryStore<T>,
    frame_textures: Option<FrameTextures<T>>,
}

impl<T> Engine<T> {
    pub fn new(features: FeatureSettings) -> Self {
        Self {
            features,
            state: EngineState::Pending,
            setup_notice: Default::default(),
            activation: Default::default(),
            quality: Default::default(),
            frame_counter: Default::default(),
            history: Default::default(),
            frame_textures: None,
        }
    }

    pub fn features(&self) -> &FeatureSettings {
        &self.features
    }

    pub fn set_features(&mut self, features: FeatureSettings) {
        self.features = features;
    }

    pub fn frame_counter(&self) -> FrameCounter {
        self.frame_counter
    }

    pub fn history(&self) -> &HistoryStore<T> {
        &self.history
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// Checks whether the backend provides every kernel the pipeline needs.
    ///
    /// If it doesn't, the engine stays disabled and every frame is skipped
    /// with [`SkipReason::Disabled`].
    pub fn setup(
        &mut self,
        backend: &impl Backend<Texture = T>,
    ) -> Result<(), SetupError> {
        let missing: Vec<_> = Kernel::ALL
            .into_iter()
            .filter(|&kernel| !backend.supports(kernel))
            .collect();

        if missing.is_empty() {
            info!("SSGI initialized");

            self.state = EngineState::Ready;
            Ok(())
        } else {
            let err = SetupError::MissingKernels(missing);

            if self.setup_notice.fire() {
                error!("{err}; SSGI stays disabled");
            }

            self.state = EngineState::Disabled;
            Err(err)
        }
    }

    /// Resolves this frame's configuration; called once per frame, before
    /// any camera is rendered.
    pub fn configure(
        &mut self,
        settings: &mut SsgiSettings,
        host: &impl HostRenderer<T>,
        platform: &PlatformCaps,
        env: &FrameEnvironment,
        debugger_active: bool,
    ) -> Result<FrameConfig, SkipReason> {
        self.ensure_ready()?;
        settings.sanitize();
        self.quality.resolve(&mut settings.quality);

        self.activation
            .check_frame(settings, &self.features, debugger_active)?;

        let renderer = RendererState {
            rendering_path: host.rendering_path(),
            gbuffer_produced: host.active_gbuffer().is_some(),
            thickness_mode: settings.thickness_mode,
            backface_lighting: self.features.backface_lighting,
        };

        let rendering_layers = (host.writes_rendering_layers()
            && settings.rendering_layers != SsgiSettings::ALL_RENDERING_LAYERS)
            .then_some(settings.rendering_layers);

        let ambient = if self.features.override_ambient {
            env.ambient_sh()
        } else {
            Default::default()
        };

        Ok(FrameConfig {
            ray_steps: RaySteps::new(settings.quality.max_ray_steps()),
            ray_count: settings.quality.sample_count(),
            scale: settings.effective_scale(),
            thickness: settings.depth_buffer_thickness(),
            denoise: FrameConfig::denoise_of(settings),
            indirect_diffuse_multiplier: settings.indirect_diffuse_multiplier(),
            rendering_layers,
            override_ambient: self.features.override_ambient,
            ambient,
            gbuffer: GBufferPolicy::decide(&renderer, platform),
            gbuffer_formats: GBufferFormats::negotiate(platform),
            use_probe_fallback: settings.ray_miss == RayMiss::ReflectionProbes
                && !renderer.rendering_path.has_probe_atlas(),
        })
    }

    /// Rewrites scene-view motion vectors that the host rendered without
    /// the previous frame's matrices; returns whether anything was
    /// recorded.
    pub fn fix_motion_vectors(
        &mut self,
        backend: &mut impl Backend<Texture = T>,
        camera: &Camera,
        host: &impl HostRenderer<T>,
    ) -> bool {
        if !self.is_ready()
            || camera.kind != CameraKind::SceneView
            || !camera.motion_vectors_stale
        {
            return false;
        }

        let Some(targets) = host.motion_vector_targets() else {
            warn!(
                "Camera {} has stale motion vectors, but the host didn't \
                 expose its motion vector targets",
                camera.id
            );

            return false;
        };

        let view_proj = camera.view_proj();

        let prev_inv_view_proj = self
            .history
            .find(camera.id)
            .map(|idx| self.history.get(idx))
            .filter(|record| !record.is_fresh())
            .map(|record| record.prev_inv_view_proj)
            .unwrap_or_else(|| view_proj.inverse());

        let params = gpu::PassParams {
            prev_inv_view_proj,
            view_proj,
            prev_view_proj: prev_inv_view_proj.inverse(),
            ..Default::default()
        };

        backend.run_kernel(
            Kernel::FixMotionVectors,
            &[Some(&targets.depth)],
            &[&targets.color],
            &params,
        );

        true
    }

    /// Renders SSGI for given camera, compositing it into the camera's
    /// color target.
    pub fn render(
        &mut self,
        backend: &mut impl Backend<Texture = T>,
        config: &FrameConfig,
        camera: &Camera,
        inputs: &FrameInputs<'_, T>,
        probes: &[ReflectionProbe<T>],
    ) -> Result<FrameReport, SkipReason> {
        self.ensure_ready()?;
        Activation::check_camera(camera, &self.features)?;

        utils::measure("ssgi_render", || {
            Ok(self.render_camera(backend, config, camera, inputs, probes))
        })
    }

    fn render_camera(
        &mut self,
        backend: &mut impl Backend<Texture = T>,
        config: &FrameConfig,
        camera: &Camera,
        inputs: &FrameInputs<'_, T>,
        probes: &[ReflectionProbe<T>],
    ) -> FrameReport {
        let key = TexturesKey {
            size: camera.size,
            scaled_size: camera.scaled_size(config.scale),
            color_format: inputs.color_format,
            override_ambient: config.override_ambient,
        };

        let (slot, evicted) = self.history.ensure(camera.id);

        if let Some(evicted) = evicted {
            evicted.release(backend);
        }

        let record = self.history.get_mut(slot);
        let fresh = record.is_fresh();

        if fresh {
            debug!("Rendering new camera: {}", camera.describe());
        }

        if record.denoised != Some(config.denoise.enabled)
            || record.scaled_size != key.scaled_size
        {
            record.invalidate();
        }

        let history = match record.textures.take() {
            Some(textures) if textures.matches(&key) => textures,

            textures => {
                if let Some(textures) = textures {
                    textures.release(backend);
                }

                record.invalidate();
                HistoryTextures::new(backend, camera.id, key)
            }
        };

        record.scaled_size = key.scaled_size;

        let previous = if fresh || camera.is_reflection() {
            PreviousFrame {
                inv_view_proj: camera.inv_view_proj(),
                position: camera.position,
                valid: record.valid,
            }
        } else {
            PreviousFrame {
                inv_view_proj: record.prev_inv_view_proj,
                position: record.prev_position,
                valid: record.valid,
            }
        };

        // Reflection cameras render in-between regular frames and would
        // break their reprojection
        if !camera.is_reflection() {
            record.prev_inv_view_proj = camera.inv_view_proj();
            record.prev_position = camera.position;
        }

        let probe = if config.use_probe_fallback {
            ProbeResolver::select(probes, camera.position)
        } else {
            None
        };

        let frame_counter = self.frame_counter;

        let params = config.pass_params(
            camera,
            inputs,
            previous,
            probe.map(|(_, probe)| probe),
            frame_counter,
        );

        self.frame_counter.advance();

        let frame =
            FrameTextures::ensure(&mut self.frame_textures, backend, key);

        let history = record.textures.insert(history);

        let stages = Accumulation {
            plan: config.plan(),
            frame,
            history,
            inputs,
            probe: probe.map(|(_, probe)| &probe.texture),
            params,
        }
        .run(backend);

        record.valid = true;
        record.denoised = Some(config.denoise.enabled);

        FrameReport {
            slot,
            history_valid: previous.valid,
            frame_index: frame_counter.get(),
            probe: probe.map(|(idx, _)| idx),
            stages,
        }
    }

    /// Releases the history of a camera the host doesn't use anymore.
    pub fn forget_camera(
        &mut self,
        backend: &mut impl Backend<Texture = T>,
        id: CameraId,
    ) -> bool {
        if let Some(record) = self.history.remove(id) {
            record.release(backend);
            true
        } else {
            false
        }
    }

    /// Releases every texture owned by the engine.
    pub fn dispose(&mut self, backend: &mut impl Backend<Texture = T>) {
        info!("Disposing SSGI ({} tracked cameras)", self.history.len());

        for record in self.history.drain() {
            record.release(backend);
        }

        if let Some(frame_textures) = self.frame_textures.take() {
            frame_textures.release(backend);
        }
    }

    fn ensure_ready(&self) -> Result<(), SkipReason> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(SkipReason::Disabled)
        }
    }
}

impl<T> Drop for Engine<T> {
    fn drop(&mut self) {
        if !self.history.is_empty() || self.frame_textures.is_some() {
            warn!(
                "SSGI engine dropped without being disposed; textures of {} \
                 cameras are leaked",
                self.history.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3, Mat4, UVec2, Vec3, Vec4};

    use super::*;

    const SIZE: UVec2 = UVec2::new(64, 32);

    struct Host {
        path: RenderingPath,
        gbuffer: Option<GBufferTargets<GraphTexture>>,
        motion: Option<MotionVectorTargets<GraphTexture>>,
        rendering_layers: bool,
    }

    impl HostRenderer<GraphTexture> for Host {
        fn rendering_path(&self) -> RenderingPath {
            self.path
        }

        fn active_gbuffer(&self) -> Option<&GBufferTargets<GraphTexture>> {
            self.gbuffer.as_ref()
        }

        fn motion_vector_targets(
            &self,
        ) -> Option<&MotionVectorTargets<GraphTexture>> {
            self.motion.as_ref()
        }

        fn writes_rendering_layers(&self) -> bool {
            self.rendering_layers
        }
    }

    struct Scene {
        backend: GraphBackend,
        engine: Engine<GraphTexture>,
        host: Host,
        settings: SsgiSettings,
        color: GraphTexture,
        depth: GraphTexture,
        motion_vectors: GraphTexture,
    }

    impl Scene {
        fn new() -> Self {
            Self::with_backend(GraphBackend::new())
        }

        fn with_backend(mut backend: GraphBackend) -> Self {
            let color = backend.import(TextureDesc::new(
                "color",
                SIZE,
                wgpu::TextureFormat::Rgba16Float,
            ));

            let depth = backend.import(TextureDesc::new(
                "depth",
                SIZE,
                wgpu::TextureFormat::R32Float,
            ));

            let motion_vectors = backend.import(TextureDesc::new(
                "motion_vectors",
                SIZE,
                wgpu::TextureFormat::Rg16Float,
            ));

            let mut engine = Engine::new(FeatureSettings::default());
            let _ = engine.setup(&backend);

            Self {
                backend,
                engine,
                host: Host {
                    path: RenderingPath::Forward,
                    gbuffer: None,
                    motion: None,
                    rendering_layers: false,
                },
                settings: SsgiSettings {
                    enable: true,
                    ..Default::default()
                },
                color,
                depth,
                motion_vectors,
            }
        }

        fn configure(&mut self) -> Result<FrameConfig, SkipReason> {
            self.engine.configure(
                &mut self.settings,
                &self.host,
                &PlatformCaps::default(),
                &FrameEnvironment::default(),
                false,
            )
        }

        fn render_with(
            &mut self,
            camera: &Camera,
            probes: &[ReflectionProbe<GraphTexture>],
        ) -> Result<FrameReport, SkipReason> {
            let config = self.configure()?;

            let inputs = FrameInputs {
                color: &self.color,
                color_format: wgpu::TextureFormat::Rgba16Float,
                depth: &self.depth,
                motion_vectors: &self.motion_vectors,
                backface_depth: None,
                backface_color: None,
                gbuffer: None,
            };

            self.engine
                .render(&mut self.backend, &config, camera, &inputs, probes)
        }

        fn render(
            &mut self,
            camera: &Camera,
        ) -> Result<FrameReport, SkipReason> {
            self.render_with(camera, &[])
        }

        fn skip_reason(&mut self, camera: &Camera) -> Option<SkipReason> {
            self.render(camera).err()
        }

        fn fix_motion_vectors(&mut self, camera: &Camera) -> bool {
            self.engine
                .fix_motion_vectors(&mut self.backend, camera, &self.host)
        }

        fn forget(&mut self, id: u64) -> bool {
            self.engine
                .forget_camera(&mut self.backend, CameraId::new(id))
        }

        fn kernels(&mut self) -> Vec<Kernel> {
            let kernels = self.backend.kernels();

            self.backend.take_nodes();
            kernels
        }

        fn ray_march(&self) -> &GraphNode {
            self.backend
                .nodes()
                .iter()
                .find(|node| node.kernel() == Some(Kernel::RayMarch))
                .unwrap()
        }
    }

    fn camera(id: u64) -> Camera {
        Camera {
            id: CameraId::new(id),
            size: SIZE,
            ..Default::default()
        }
    }

    #[test]
    fn setup_with_missing_kernel() {
        let backend = GraphBackend::new().without_kernel(Kernel::Reproject);
        let mut scene = Scene::with_backend(backend);

        assert!(!scene.engine.is_ready());

        let err = scene.engine.setup(&scene.backend).unwrap_err();

        assert!(matches!(
            err,
            SetupError::MissingKernels(kernels)
                if kernels == [Kernel::Reproject]
        ));

        assert_eq!(Some(SkipReason::Disabled), scene.configure().err());
        assert_eq!(Some(SkipReason::Disabled), scene.skip_reason(&camera(1)));
        assert!(scene.backend.nodes().is_empty());
    }

    #[test]
    fn pipeline() {
        let mut scene = Scene::new();

        scene.render(&camera(1)).unwrap();

        assert_eq!(
            vec![
                Kernel::ExtractDirectLighting,
                Kernel::RayMarch,
                Kernel::Reproject,
                Kernel::AggressiveBlur,
                Kernel::AggressiveBlur,
                Kernel::SecondBlurA,
                Kernel::SecondBlurB,
                Kernel::HistoryDepth,
                Kernel::Combine,
                Kernel::Blit,
            ],
            scene.kernels()
        );

        // Diffuse and sample count are copied into history
        scene.render(&camera(1)).unwrap();

        let copies = scene
            .backend
            .nodes()
            .iter()
            .filter(|node| node.op == GraphOp::Copy)
            .count();

        assert_eq!(2, copies);
    }

    #[test]
    fn pipeline_without_denoise() {
        let mut scene = Scene::new();

        scene.settings.denoise.enabled = false;
        scene.engine.set_features(FeatureSettings {
            override_ambient: false,
            ..Default::default()
        });

        let report = scene.render(&camera(1)).unwrap();

        assert_eq!(
            vec![
                Kernel::Blit,
                Kernel::RayMarch,
                Kernel::HistoryDepth,
                Kernel::Combine,
                Kernel::Blit,
            ],
            scene.kernels()
        );

        assert_eq!(
            vec![
                Stage::Idle,
                Stage::DirectLightExtracted,
                Stage::RayMarched,
                Stage::HistoryUpdated,
                Stage::Combined,
                Stage::HistoryStored,
            ],
            report.stages
        );
    }

    #[test]
    fn pipeline_with_aggressive_blur_only() {
        let mut scene = Scene::new();

        scene.settings.denoise.second_pass = false;
        scene.render(&camera(1)).unwrap();

        assert_eq!(
            vec![
                Kernel::ExtractDirectLighting,
                Kernel::RayMarch,
                Kernel::Reproject,
                Kernel::AggressiveBlur,
                Kernel::AggressiveBlur,
                Kernel::HistoryDepth,
                Kernel::Combine,
                Kernel::Blit,
            ],
            scene.kernels()
        );
    }

    #[test]
    fn empty_viewport() {
        let mut scene = Scene::new();

        for size in [uvec2(0, 0), uvec2(SIZE.x, 0)] {
            let camera = Camera { size, ..camera(1) };

            assert_eq!(
                Some(SkipReason::EmptyViewport),
                scene.skip_reason(&camera)
            );
        }

        assert!(scene.backend.nodes().is_empty());
        assert_eq!(0, scene.backend.created_textures());
        assert!(scene.engine.history().is_empty());

        scene.render(&camera(1)).unwrap();
    }

    #[test]
    fn history_validity() {
        let mut scene = Scene::new();

        // First frame: the intermediate color stands in for history
        let report = scene.render(&camera(1)).unwrap();
        let ray_march = scene.ray_march().clone();
        let intermediate_color = scene.backend.nodes()[0].writes[0];

        assert!(!report.history_valid);
        assert!(!ray_march.params.unwrap().has_history());
        assert_eq!(Some(intermediate_color), ray_march.reads[3]);

        scene.backend.take_nodes();

        // Second frame: real history
        let report = scene.render(&camera(1)).unwrap();
        let ray_march = scene.ray_march().clone();
        let history_color = ray_march.reads[3].unwrap();

        assert!(report.history_valid);
        assert!(ray_march.params.unwrap().has_history());
        assert_eq!(
            "ssgi_history_color",
            scene.backend.resource(history_color).desc.label
        );

        scene.backend.take_nodes();

        // Toggling denoise invalidates history
        scene.settings.denoise.enabled = false;
        assert!(!scene.render(&camera(1)).unwrap().history_valid);
        assert!(scene.render(&camera(1)).unwrap().history_valid);

        scene.settings.denoise.enabled = true;
        assert!(!scene.render(&camera(1)).unwrap().history_valid);

        // ... and so does changing the resolution scale
        scene.settings.resolution_scale = 0.25;
        assert!(!scene.render(&camera(1)).unwrap().history_valid);
        assert!(scene.render(&camera(1)).unwrap().history_valid);
    }

    #[test]
    fn skipped_frames_leave_state_untouched() {
        let mut scene = Scene::new();

        scene.render(&camera(1)).unwrap();
        scene.backend.take_nodes();

        let counter = scene.engine.frame_counter();

        scene.settings.enable = false;

        assert_eq!(Some(SkipReason::Inactive), scene.skip_reason(&camera(1)));

        scene.settings.enable = true;

        let preview = Camera {
            kind: CameraKind::Preview,
            ..camera(2)
        };

        assert_eq!(
            Some(SkipReason::PreviewCamera),
            scene.skip_reason(&preview)
        );
        assert!(scene.backend.nodes().is_empty());
        assert_eq!(counter, scene.engine.frame_counter());
        assert_eq!(1, scene.engine.history().len());
    }

    #[test]
    fn frame_counter() {
        let mut scene = Scene::new();

        let a = scene.render(&camera(1)).unwrap();
        let b = scene.render(&camera(2)).unwrap();
        let c = scene.render(&camera(1)).unwrap();

        assert_eq!((0, 33, 66), (a.frame_index, b.frame_index, c.frame_index));

        let rotator = scene
            .ray_march()
            .params
            .unwrap()
            .blur_rotator;

        // First recorded frame, i.e. `frame_count = 0`
        assert_eq!(FrameCounter::new(0).rotator(), rotator);
    }

    #[test]
    fn eviction_releases_textures_once() {
        let mut scene = Scene::new();

        for id in 1..=4 {
            scene.render(&camera(id)).unwrap();
        }

        // 4 history textures per camera + 5 frame textures
        assert_eq!(4 * 4 + 5, scene.backend.live_textures());
        assert_eq!(0, scene.backend.released_textures());

        let report = scene.render(&camera(5)).unwrap();

        assert_eq!(0, report.slot);
        assert_eq!(4, scene.backend.released_textures());
        assert_eq!(4 * 4 + 5, scene.backend.live_textures());
        assert_eq!(None, scene.engine.history().find(CameraId::new(1)));

        // Camera 1 comes back as a new one
        let report = scene.render(&camera(1)).unwrap();

        assert!(!report.history_valid);
        assert_eq!(8, scene.backend.released_textures());
    }

    #[test]
    fn resize_reallocates() {
        let mut scene = Scene::new();

        scene.render(&camera(1)).unwrap();

        let resized = Camera {
            size: uvec2(32, 32),
            ..camera(1)
        };

        let report = scene.render(&resized).unwrap();

        assert!(!report.history_valid);

        // Old history (4) and old frame textures (5) are gone
        assert_eq!(9, scene.backend.released_textures());
        assert_eq!(4 + 5, scene.backend.live_textures());
    }

    #[test]
    fn dispose() {
        let mut scene = Scene::new();

        scene.render(&camera(1)).unwrap();
        scene.render(&camera(2)).unwrap();

        assert!(scene.forget(2));
        assert!(!scene.forget(2));

        scene.engine.dispose(&mut scene.backend);

        assert_eq!(0, scene.backend.live_textures());
        assert!(scene.engine.history().is_empty());
    }

    #[test]
    fn previous_matrices() {
        let mut scene = Scene::new();

        let mut camera = Camera {
            view: Mat4::from_translation(vec3(1.0, 0.0, 0.0)),
            position: vec3(-1.0, 0.0, 0.0),
            ..camera(1)
        };

        let first_inv_view_proj = camera.inv_view_proj();

        // First frame reprojects onto itself
        scene.render(&camera).unwrap();

        let params = scene.ray_march().params.unwrap();

        assert_eq!(first_inv_view_proj, params.prev_inv_view_proj);
        assert_eq!(Vec4::new(-1.0, 0.0, 0.0, 0.0), params.prev_camera_position);

        scene.backend.take_nodes();

        camera.view = Mat4::from_translation(vec3(2.0, 0.0, 0.0));
        camera.position = vec3(-2.0, 0.0, 0.0);

        scene.render(&camera).unwrap();

        let params = scene.ray_march().params.unwrap();

        assert_eq!(first_inv_view_proj, params.prev_inv_view_proj);
        assert_eq!(0.0, params.is_probe_camera);
    }

    #[test]
    fn reflection_cameras_keep_previous_matrices() {
        let mut scene = Scene::new();

        let camera = Camera {
            kind: CameraKind::Reflection,
            position: vec3(3.0, 0.0, 0.0),
            ..camera(1)
        };

        scene.render(&camera).unwrap();

        let record = scene.engine.history().get(0);

        assert_eq!(Mat4::ZERO, record.prev_inv_view_proj);
        assert_eq!(Vec3::ZERO, record.prev_position);
        assert_eq!(1.0, scene.ray_march().params.unwrap().is_probe_camera);
    }

    #[test]
    fn probe_fallback() {
        let mut scene = Scene::new();

        let cubemap = scene.backend.import(TextureDesc::new(
            "probe",
            uvec2(16, 16),
            wgpu::TextureFormat::Rgba16Float,
        ));

        let probes = [ReflectionProbe {
            bounds: Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0)),
            importance: 1,
            position: Vec3::ZERO,
            box_projection: true,
            hdr_decode: Vec4::ONE,
            texture: cubemap,
        }];

        let report = scene.render_with(&camera(1), &probes).unwrap();
        let ray_march = scene.ray_march().clone();
        let params = ray_march.params.unwrap();

        assert_eq!(Some(0), report.probe);
        assert_eq!(Some(cubemap), ray_march.reads[10]);
        assert!(params.has_probe());
        assert!(params.probe.is_box_projected());
        assert_eq!(0.0, params.probe_weight);

        // Forward+ reads probes from its own atlas
        scene.backend.take_nodes();
        scene.host.path = RenderingPath::ForwardPlus;

        let report = scene.render_with(&camera(1), &probes).unwrap();

        assert_eq!(None, report.probe);
        assert_eq!(None, scene.ray_march().reads[10]);
        assert!(!scene.ray_march().params.unwrap().has_probe());
    }

    #[test]
    fn frame_config() {
        let mut scene = Scene::new();

        scene.settings.quality.set_mode(QualityMode::High);
        scene.settings.rendering_layers = 0b101;
        scene.settings.denoise.radius = 0.5;

        let config = scene.configure().unwrap();

        assert_eq!(4, config.ray_count);
        assert_eq!(RaySteps::new(64), config.ray_steps);
        assert_eq!(None, config.rendering_layers);
        assert!(config.use_probe_fallback);
        assert!(config.gbuffer.needs_forward_gbuffer);

        scene.host.rendering_layers = true;

        let config = scene.configure().unwrap();

        assert_eq!(Some(0b101), config.rendering_layers);

        let params = config.pass_params::<GraphTexture>(
            &camera(1),
            &FrameInputs {
                color: &scene.color,
                color_format: wgpu::TextureFormat::Rgba16Float,
                depth: &scene.depth,
                motion_vectors: &scene.motion_vectors,
                backface_depth: Some(&scene.depth),
                backface_color: None,
                gbuffer: None,
            },
            PreviousFrame {
                inv_view_proj: Mat4::IDENTITY,
                position: Vec3::ZERO,
                valid: true,
            },
            None,
            FrameCounter::default(),
        );

        assert_eq!(1, params.use_rendering_layers);
        assert_eq!(0b101, params.rendering_layers);
        assert_eq!(1.0, params.denoiser_radius);
        assert_eq!(1.0, params.back_depth_enabled);
        assert_eq!(gpu::MAX_BRIGHTNESS, params.max_brightness);
        assert_eq!(0.5, params.down_sample);
    }

    #[test]
    fn scene_view_motion_vectors() {
        let mut scene = Scene::new();

        let camera = Camera {
            kind: CameraKind::SceneView,
            motion_vectors_stale: true,
            ..camera(1)
        };

        // No targets exposed
        assert!(!scene.fix_motion_vectors(&camera));

        scene.host.motion = Some(MotionVectorTargets {
            color: scene.motion_vectors,
            depth: scene.depth,
        });

        assert!(scene.fix_motion_vectors(&camera));

        let game = Camera {
            kind: CameraKind::Game,
            ..camera.clone()
        };

        assert!(!scene.fix_motion_vectors(&game));

        let nodes = scene.backend.take_nodes();

        assert_eq!(1, nodes.len());
        assert_eq!(Some(Kernel::FixMotionVectors), nodes[0].kernel());
        assert_eq!(vec![Some(scene.depth)], nodes[0].reads);
        assert_eq!(vec![scene.motion_vectors], nodes[0].writes);
    }
}

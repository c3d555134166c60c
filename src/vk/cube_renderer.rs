use super::{Frame, Instance, Renderable, Swapchain};
use crate::camera::Camera;
use crate::voxel::{Color, CubeSink};
use erupt::vk;

/// Per-instance vertex data, matching the attributes in `cube.vert`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeInstance {
    position: [f32; 3],
    size: [f32; 3],
    color: [u8; 4],
}

/// Cubes recorded for the current frame.
#[derive(Debug, Default)]
pub struct CubeBatch {
    cubes: Vec<CubeInstance>,
}

impl CubeBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cubes: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.cubes.clear()
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }
}

impl CubeSink for CubeBatch {
    fn draw_cube(&mut self, position: uv::Vec3, size: uv::Vec3, color: Color) {
        self.cubes.push(CubeInstance {
            position: [position.x, position.y, position.z],
            size: [size.x, size.y, size.z],
            color: [color.r, color.g, color.b, color.a],
        })
    }
}

struct InstanceBuffer {
    buffer: vk::Buffer,
    allocation: vk_alloc::Allocation,
    capacity: usize,
}

impl InstanceBuffer {
    fn new(instance: &impl Instance, capacity: usize) -> Self {
        let device = instance.device();
        let allocator = instance.allocator();

        let buffer_info = vk::BufferCreateInfoBuilder::new()
            .size((std::mem::size_of::<CubeInstance>() * capacity) as vk::DeviceSize)
            .usage(vk::BufferUsageFlags::VERTEX_BUFFER)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer = unsafe { device.create_buffer(&buffer_info, None) }.unwrap();

        let allocation = allocator
            .allocate_memory_for_buffer(device, buffer, vk_alloc::MemoryLocation::CpuToGpu)
            .expect("out of memory for cube instances");
        unsafe { device.bind_buffer_memory(buffer, allocation.device_memory, allocation.offset) }
            .unwrap();

        Self {
            buffer,
            allocation,
            capacity,
        }
    }

    fn write(&mut self, cubes: &[CubeInstance]) {
        assert!(cubes.len() <= self.capacity);
        let slice = self
            .allocation
            .mapped_slice_mut()
            .ok()
            .flatten()
            .expect("instance buffer is not host visible");
        assert!(slice.len() >= std::mem::size_of_val(cubes));
        unsafe {
            std::ptr::copy_nonoverlapping(cubes.as_ptr(), slice.as_mut_ptr().cast(), cubes.len())
        }
    }

    fn destroy(&self, instance: &impl Instance) {
        let device = instance.device();
        unsafe {
            if let Err(err) = instance.allocator().deallocate(device, &self.allocation) {
                log::error!("failed to free instance buffer: {:?}", err)
            }
            device.destroy_buffer(Some(self.buffer), None);
        }
    }
}

/// Draws a [`CubeBatch`] as one instanced draw of 36 vertices per cube.
pub struct CubeRenderer<T: Instance> {
    instance: std::sync::Arc<T>,
    layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    aspect: f32,
    buffers: Vec<InstanceBuffer>,
}

impl<T: Instance> CubeRenderer<T> {
    const VERTICES_PER_CUBE: u32 = 36;

    pub fn new(instance: std::sync::Arc<T>, surface: &impl Renderable, capacity: usize) -> Self {
        let (layout, pipeline) = create_pipeline(instance.device(), surface);
        let buffers = (0..Swapchain::frames_in_flight())
            .map(|_| InstanceBuffer::new(instance.as_ref(), capacity.max(1)))
            .collect();
        Self {
            instance,
            layout,
            pipeline,
            aspect: surface.render_info().aspect(),
            buffers,
        }
    }

    pub fn render(&mut self, frame: Frame, batch: &CubeBatch, camera: &Camera) {
        if batch.is_empty() {
            return;
        }
        self.reserve(frame.slot, batch.len());
        let buffer = &mut self.buffers[frame.slot];
        buffer.write(&batch.cubes);

        let view_projection = camera.view_projection(self.aspect);
        let device = self.instance.device();
        unsafe {
            device.cmd_bind_pipeline(
                frame.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline,
            );
            device.cmd_push_constants(
                frame.command_buffer,
                self.layout,
                vk::ShaderStageFlags::VERTEX,
                0,
                std::mem::size_of::<uv::Mat4>() as u32,
                view_projection.as_ptr().cast(),
            );
            device.cmd_bind_vertex_buffers(frame.command_buffer, 0, &[buffer.buffer], &[0]);
            device.cmd_draw(
                frame.command_buffer,
                Self::VERTICES_PER_CUBE,
                batch.len() as u32,
                0,
                0,
            )
        }
    }

    fn reserve(&mut self, slot: usize, len: usize) {
        if self.buffers[slot].capacity >= len {
            return;
        }
        let capacity = len.next_power_of_two();
        log::debug!("growing cube instance buffer {} to {}", slot, capacity);
        // The swapchain waited on this slot's fence, so the old buffer is idle.
        self.buffers[slot].destroy(self.instance.as_ref());
        self.buffers[slot] = InstanceBuffer::new(self.instance.as_ref(), capacity);
    }

    pub fn rebuild(&mut self, surface: &impl Renderable) {
        let device = self.instance.device();
        unsafe {
            device.destroy_pipeline(Some(self.pipeline), None);
            device.destroy_pipeline_layout(Some(self.layout), None);
        }
        let (layout, pipeline) = create_pipeline(device, surface);
        self.layout = layout;
        self.pipeline = pipeline;
        self.aspect = surface.render_info().aspect();
    }
}

impl<T: Instance> Drop for CubeRenderer<T> {
    fn drop(&mut self) {
        for buffer in &self.buffers {
            buffer.destroy(self.instance.as_ref())
        }
        let device = self.instance.device();
        unsafe {
            device.destroy_pipeline(Some(self.pipeline), None);
            device.destroy_pipeline_layout(Some(self.layout), None)
        }
    }
}

fn create_shader_module(device: &erupt::DeviceLoader, spv: &[u8]) -> vk::ShaderModule {
    let code = erupt::utils::decode_spv(spv).expect("shader is not valid SPIR-V");
    let create_info = vk::ShaderModuleCreateInfoBuilder::new().code(&code);
    unsafe { device.create_shader_module(&create_info, None) }.unwrap()
}

fn create_pipeline(
    device: &erupt::DeviceLoader,
    surface: &impl Renderable,
) -> (vk::PipelineLayout, vk::Pipeline) {
    let render_info = surface.render_info();

    let vert_shader_module = create_shader_module(device, include_shader!("cube.vert"));
    let frag_shader_module = create_shader_module(device, include_shader!("cube.frag"));
    let entry_point = std::ffi::CString::new("main").unwrap();

    let stages = [
        vk::PipelineShaderStageCreateInfoBuilder::new()
            .stage(vk::ShaderStageFlagBits::VERTEX)
            .module(vert_shader_module)
            .name(&entry_point),
        vk::PipelineShaderStageCreateInfoBuilder::new()
            .stage(vk::ShaderStageFlagBits::FRAGMENT)
            .module(frag_shader_module)
            .name(&entry_point),
    ];

    let instance_binding = vk::VertexInputBindingDescriptionBuilder::new()
        .binding(0)
        .stride(std::mem::size_of::<CubeInstance>() as u32)
        .input_rate(vk::VertexInputRate::INSTANCE);
    let instance_attributes = [
        vk::VertexInputAttributeDescriptionBuilder::new()
            .location(0)
            .binding(0)
            .format(vk::Format::R32G32B32_SFLOAT)
            .offset(0),
        vk::VertexInputAttributeDescriptionBuilder::new()
            .location(1)
            .binding(0)
            .format(vk::Format::R32G32B32_SFLOAT)
            .offset(12),
        vk::VertexInputAttributeDescriptionBuilder::new()
            .location(2)
            .binding(0)
            .format(vk::Format::R8G8B8A8_UNORM)
            .offset(24),
    ];
    let vertex_input_state = vk::PipelineVertexInputStateCreateInfoBuilder::new()
        .vertex_binding_descriptions(std::slice::from_ref(&instance_binding))
        .vertex_attribute_descriptions(&instance_attributes);

    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfoBuilder::new()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    let viewport = vk::ViewportBuilder::new()
        .x(0.0)
        .y(0.0)
        .width(render_info.extent.width as f32)
        .height(render_info.extent.height as f32)
        .min_depth(0.0)
        .max_depth(1.0);
    let scissor = vk::Rect2DBuilder::new()
        .offset(vk::Offset2D { x: 0, y: 0 })
        .extent(render_info.extent);
    let viewport_state = vk::PipelineViewportStateCreateInfoBuilder::new()
        .viewports(std::slice::from_ref(&viewport))
        .scissors(std::slice::from_ref(&scissor));

    // faces in cube.vert are not consistently wound, so nothing is culled
    let rasterization_state = vk::PipelineRasterizationStateCreateInfoBuilder::new()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .cull_mode(vk::CullModeFlags::NONE)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .depth_bias_enable(false)
        .line_width(1.0);

    let multisample_state = vk::PipelineMultisampleStateCreateInfoBuilder::new()
        .rasterization_samples(vk::SampleCountFlagBits::_1)
        .sample_shading_enable(false)
        .alpha_to_coverage_enable(false)
        .alpha_to_one_enable(false);

    let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfoBuilder::new()
        .depth_test_enable(true)
        .depth_write_enable(true)
        .depth_compare_op(vk::CompareOp::LESS)
        .depth_bounds_test_enable(false)
        .stencil_test_enable(false);

    let color_blend_attachment = vk::PipelineColorBlendAttachmentStateBuilder::new()
        .blend_enable(false)
        .color_write_mask(vk::ColorComponentFlags::all());
    let color_blend_state = vk::PipelineColorBlendStateCreateInfoBuilder::new()
        .logic_op_enable(false)
        .attachments(std::slice::from_ref(&color_blend_attachment))
        .blend_constants([0.0, 0.0, 0.0, 0.0]);

    let push_constant_range = vk::PushConstantRangeBuilder::new()
        .stage_flags(vk::ShaderStageFlags::VERTEX)
        .offset(0)
        .size(std::mem::size_of::<uv::Mat4>() as u32);
    let layout_create_info = vk::PipelineLayoutCreateInfoBuilder::new()
        .push_constant_ranges(std::slice::from_ref(&push_constant_range));
    let layout = unsafe { device.create_pipeline_layout(&layout_create_info, None) }.unwrap();

    let pipeline_create_info = vk::GraphicsPipelineCreateInfoBuilder::new()
        .stages(&stages)
        .vertex_input_state(&vertex_input_state)
        .input_assembly_state(&input_assembly_state)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization_state)
        .multisample_state(&multisample_state)
        .depth_stencil_state(&depth_stencil_state)
        .color_blend_state(&color_blend_state)
        .layout(layout)
        .render_pass(render_info.render_pass)
        .subpass(0);
    let pipeline =
        unsafe { device.create_graphics_pipelines(None, &[pipeline_create_info], None) }.unwrap()
            [0];

    unsafe {
        device.destroy_shader_module(Some(vert_shader_module), None);
        device.destroy_shader_module(Some(frag_shader_module), None);
    }

    (layout, pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_layout_matches_vertex_attributes() {
        assert_eq!(std::mem::size_of::<CubeInstance>(), 28);
        assert_eq!(std::mem::align_of::<CubeInstance>(), 4);
    }

    #[test]
    fn batch_records_cubes() {
        let mut batch = CubeBatch::with_capacity(4);
        batch.draw_cube(uv::Vec3::new(1.0, 2.0, 3.0), uv::Vec3::one(), Color::GREEN);
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.cubes[0],
            CubeInstance {
                position: [1.0, 2.0, 3.0],
                size: [1.0, 1.0, 1.0],
                color: [0, 228, 48, 255],
            }
        );
        batch.clear();
        assert!(batch.is_empty());
    }

    #[test]
    fn batch_collects_chunk_draw() {
        let mut chunk = crate::voxel::Chunk::new();
        chunk.fill(crate::voxel::VoxelKind::Water);
        let mut batch = CubeBatch::default();
        chunk.draw(&mut batch);
        assert_eq!(batch.len(), 4096);
    }
}

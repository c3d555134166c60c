use super::{debug, QueueInfo, SwapchainInfo};
use erupt::{vk, ExtendableFromConst};
use raw_window_handle::HasRawWindowHandle;
use std::mem::ManuallyDrop;
use std::os::raw::c_char;

const VAL_LAYER: *const c_char = erupt::cstr!("VK_LAYER_KHRONOS_validation");

pub trait Instance {
    fn device(&self) -> &erupt::DeviceLoader;
    fn allocator(&self) -> &vk_alloc::Allocator;
    fn graphics_queue(&self) -> QueueInfo;

    fn wait_idle(&self) {
        unsafe { self.device().device_wait_idle() }
            .result()
            .expect("device lost while waiting for idle")
    }
}

/// Vulkan entry, instance, device and allocator bound to one window surface.
pub struct WindowedInstance {
    entry: ManuallyDrop<erupt::EntryLoader>,
    instance: ManuallyDrop<erupt::InstanceLoader>,
    device: ManuallyDrop<erupt::DeviceLoader>,
    allocator: vk_alloc::Allocator,

    messenger: Option<vk::DebugUtilsMessengerEXT>,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
    graphics_queue: QueueInfo,
    present_queue: QueueInfo,
}

struct QueueFamilies {
    graphics: u32,
    present: u32,
}

impl WindowedInstance {
    pub fn new(window: &impl HasRawWindowHandle, validation: bool) -> std::sync::Arc<Self> {
        let mut instance_extensions = erupt::utils::surface::enumerate_required_extensions(window)
            .result()
            .expect("window system exposes no Vulkan surface extensions");
        let layers = if validation {
            instance_extensions.push(vk::EXT_DEBUG_UTILS_EXTENSION_NAME);
            vec![VAL_LAYER]
        } else {
            Vec::new()
        };

        let entry = erupt::EntryLoader::new().expect("failed to load the Vulkan library");
        let (instance, messenger) = create_instance(&entry, &instance_extensions, &layers, validation);

        let surface = unsafe { erupt::utils::surface::create_surface(&instance, window, None) }
            .result()
            .expect("failed to create window surface");

        let (physical_device, families) = pick_physical_device(&instance, surface)
            .expect("no Vulkan device can draw to this window");
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        log::info!(
            "using {:?}",
            unsafe { std::ffi::CStr::from_ptr(properties.device_name.as_ptr()) }
        );

        let (device, graphics_queue, present_queue) =
            create_device(&instance, &layers, physical_device, &families);

        let allocator = vk_alloc::Allocator::new(&instance, physical_device, &Default::default())
            .expect("failed to create memory allocator");

        std::sync::Arc::new(Self {
            entry: ManuallyDrop::new(entry),
            instance: ManuallyDrop::new(instance),
            device: ManuallyDrop::new(device),
            allocator,

            messenger,
            surface,
            physical_device,
            graphics_queue,
            present_queue,
        })
    }

    pub fn present_queue(&self) -> QueueInfo {
        self.present_queue
    }

    pub fn swapchain_info(&self, (width, height): (u32, u32)) -> SwapchainInfo {
        let surface_caps = unsafe {
            self.instance
                .get_physical_device_surface_capabilities_khr(self.physical_device, self.surface)
        }
        .result()
        .expect("failed to query surface capabilities");

        let surface_formats = unsafe {
            self.instance.get_physical_device_surface_formats_khr(
                self.physical_device,
                self.surface,
                None,
            )
        }
        .result()
        .expect("failed to query surface formats");
        let surface_format = surface_formats
            .iter()
            .copied()
            .find(|surface_format| {
                surface_format.format == vk::Format::B8G8R8A8_SRGB
                    && surface_format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR_KHR
            })
            .unwrap_or(surface_formats[0]);

        // FIFO is always available and caps us at the display rate.
        let present_mode = vk::PresentModeKHR::FIFO_KHR;

        let extent = vk::Extent2D {
            width: width.clamp(
                surface_caps.min_image_extent.width,
                surface_caps.max_image_extent.width,
            ),
            height: height.clamp(
                surface_caps.min_image_extent.height,
                surface_caps.max_image_extent.height,
            ),
        };

        SwapchainInfo {
            surface: self.surface,
            surface_caps,
            surface_format,
            present_mode,
            extent,
        }
    }
}

impl Instance for WindowedInstance {
    fn device(&self) -> &erupt::DeviceLoader {
        &self.device
    }

    fn allocator(&self) -> &vk_alloc::Allocator {
        &self.allocator
    }

    fn graphics_queue(&self) -> QueueInfo {
        self.graphics_queue
    }
}

impl Drop for WindowedInstance {
    fn drop(&mut self) {
        unsafe {
            self.allocator.cleanup(&self.device);
            self.device.destroy_device(None);
            self.instance.destroy_surface_khr(Some(self.surface), None);
            if let Some(messenger) = self.messenger {
                self.instance
                    .destroy_debug_utils_messenger_ext(Some(messenger), None)
            }
            self.instance.destroy_instance(None);
            ManuallyDrop::drop(&mut self.device);
            ManuallyDrop::drop(&mut self.instance);
            ManuallyDrop::drop(&mut self.entry)
        }
    }
}

fn create_instance(
    entry: &erupt::EntryLoader,
    extensions: &[*const c_char],
    layers: &[*const c_char],
    validation: bool,
) -> (erupt::InstanceLoader, Option<vk::DebugUtilsMessengerEXT>) {
    let application_info = vk::ApplicationInfoBuilder::new()
        .api_version(vk::make_api_version(0, 1, 1, 0));
    let messenger_create_info = debug::create_info();
    let mut instance_create_info = vk::InstanceCreateInfoBuilder::new()
        .application_info(&application_info)
        .enabled_layer_names(layers)
        .enabled_extension_names(extensions);
    if validation {
        instance_create_info = instance_create_info.extend_from(&messenger_create_info);
    }

    let instance = unsafe { erupt::InstanceLoader::new(entry, &instance_create_info, None) }
        .expect("failed to create Vulkan instance");
    let messenger = validation.then(|| {
        unsafe { instance.create_debug_utils_messenger_ext(&messenger_create_info, None) }
            .result()
            .expect("failed to create debug messenger")
    });
    (instance, messenger)
}

fn pick_physical_device(
    instance: &erupt::InstanceLoader,
    surface: vk::SurfaceKHR,
) -> Option<(vk::PhysicalDevice, QueueFamilies)> {
    let physical_devices = unsafe { instance.enumerate_physical_devices(None) }
        .result()
        .expect("failed to enumerate physical devices");
    physical_devices
        .into_iter()
        .filter_map(|physical_device| {
            let queue_families = unsafe {
                instance.get_physical_device_queue_family_properties(physical_device, None)
            };
            let graphics = queue_families
                .iter()
                .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))?
                as u32;
            let present = (0..queue_families.len() as u32).find(|&family| {
                unsafe {
                    instance.get_physical_device_surface_support_khr(physical_device, family, surface)
                }
                .result()
                .unwrap_or(false)
            })?;
            Some((physical_device, QueueFamilies { graphics, present }))
        })
        .min_by_key(|(physical_device, _)| {
            let properties = unsafe { instance.get_physical_device_properties(*physical_device) };
            match properties.device_type {
                vk::PhysicalDeviceType::DISCRETE_GPU => 0,
                vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
                _ => 2,
            }
        })
}

fn create_device(
    instance: &erupt::InstanceLoader,
    layers: &[*const c_char],
    physical_device: vk::PhysicalDevice,
    families: &QueueFamilies,
) -> (erupt::DeviceLoader, QueueInfo, QueueInfo) {
    let mut unique_families = vec![families.graphics, families.present];
    unique_families.dedup();
    let queue_create_infos = unique_families
        .iter()
        .map(|family| {
            vk::DeviceQueueCreateInfoBuilder::new()
                .queue_family_index(*family)
                .queue_priorities(&[1.0])
        })
        .collect::<Vec<_>>();
    let extensions = [vk::KHR_SWAPCHAIN_EXTENSION_NAME];
    let features = vk::PhysicalDeviceFeaturesBuilder::new();
    let device_create_info = vk::DeviceCreateInfoBuilder::new()
        .queue_create_infos(&queue_create_infos)
        .enabled_layer_names(layers)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);
    let device =
        unsafe { erupt::DeviceLoader::new(instance, physical_device, &device_create_info, None) }
            .expect("failed to create logical device");

    let queue = |family: u32| QueueInfo {
        family,
        queue: unsafe { device.get_device_queue(family, 0) },
    };
    let (graphics, present) = (queue(families.graphics), queue(families.present));
    (device, graphics, present)
}

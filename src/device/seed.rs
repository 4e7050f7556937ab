//! Default devices loaded when no device list is configured

use super::model::{kind, Device};

/// The stock set of virtual devices
pub fn default_devices() -> Vec<Device> {
    let mut living_light = Device::new("light_1", "客厅灯", kind::LIGHT, "living_room")
        .with_status("on");
    living_light.brightness = Some(80);
    living_light.color = Some("warm_white".into());

    let mut bedroom_light = Device::new("light_2", "卧室灯", kind::LIGHT, "bedroom");
    bedroom_light.brightness = Some(50);
    bedroom_light.color = Some("warm_white".into());

    let mut ac = Device::new("ac_1", "卧室空调", kind::AC, "bedroom");
    ac.temperature = Some(26);
    ac.mode = Some("cool".into());
    ac.fan_speed = Some("medium".into());

    let mut curtain = Device::new("curtain_1", "阳台窗帘", kind::CURTAIN, "balcony")
        .with_status("closed");
    curtain.position = Some(0);

    let mut tv = Device::new("tv_1", "客厅电视", kind::TV, "living_room").with_status("on");
    tv.volume = Some(15);
    tv.channel = Some(5);

    let mut humidifier =
        Device::new("humidifier_1", "加湿器", kind::HUMIDIFIER, "bedroom").with_status("on");
    humidifier.humidity = Some(45);

    let mut fan = Device::new("fan_1", "风扇", kind::FAN, "living_room");
    fan.speed = Some("low".into());

    let mut sensor =
        Device::new("sensor_1", "温湿度传感器", kind::SENSOR, "living_room").with_status("online");
    sensor.temperature = Some(24);
    sensor.humidity = Some(50);

    vec![
        living_light,
        bedroom_light,
        ac,
        curtain,
        tv,
        humidifier,
        fan,
        sensor,
    ]
}
